//! Domain API surface.
//!
//! [`RukunApi`] groups one function per domain action by resource family.
//! Every group borrows the shared [`HttpClient`]; a mutation invalidates its
//! resource's cache namespace once the server has accepted it. Reads default
//! to the client's cache TTL unless the endpoint says otherwise.
//!
//! ```ignore
//! let bills = api.bills().get_bills(&ListQuery::default().with_status(BillStatus::Pending)).await?;
//! ```

mod admin;
mod announcements;
mod auth;
mod bills;
mod cctv;
mod documents;
mod houses;
mod payments;
mod polls;
mod reports;
mod users;

pub use admin::{AdminApi, ADMIN_STATS_TTL};
pub use announcements::AnnouncementsApi;
pub use auth::AuthApi;
pub use bills::BillsApi;
pub use cctv::CctvApi;
pub use documents::{DocumentsApi, TEMPLATES_TTL};
pub use houses::{HousesApi, HOUSES_TTL};
pub use payments::PaymentsApi;
pub use polls::PollsApi;
pub use reports::ReportsApi;
pub use users::UsersApi;

use crate::http::HttpClient;
use crate::realtime::WsManager;

#[derive(Clone, Debug)]
pub struct RukunApi {
    http: HttpClient,
    ws: WsManager,
}

impl RukunApi {
    pub fn new(http: HttpClient, ws: WsManager) -> Self {
        Self { http, ws }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn ws(&self) -> &WsManager {
        &self.ws
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http, &self.ws)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.http)
    }

    pub fn houses(&self) -> HousesApi<'_> {
        HousesApi::new(&self.http)
    }

    pub fn bills(&self) -> BillsApi<'_> {
        BillsApi::new(&self.http)
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(&self.http)
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi::new(&self.http)
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(&self.http)
    }

    pub fn announcements(&self) -> AnnouncementsApi<'_> {
        AnnouncementsApi::new(&self.http)
    }

    pub fn cctv(&self) -> CctvApi<'_> {
        CctvApi::new(&self.http)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.http)
    }

    pub fn polls(&self) -> PollsApi<'_> {
        PollsApi::new(&self.http)
    }
}
