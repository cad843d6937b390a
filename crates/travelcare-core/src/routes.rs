//! Flat screen route table and the authentication guard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every screen the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Auth,
    Dashboard,
    Chat,
    Policy,
    Coverage,
    Providers,
    Telemedicine,
    Prescriptions,
    Support,
    Booking,
    TelemedicineBooking,
    TelemedicineCall,
}

impl Route {
    pub const ALL: [Route; 12] = [
        Route::Auth,
        Route::Dashboard,
        Route::Chat,
        Route::Policy,
        Route::Coverage,
        Route::Providers,
        Route::Telemedicine,
        Route::Prescriptions,
        Route::Support,
        Route::Booking,
        Route::TelemedicineBooking,
        Route::TelemedicineCall,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::Dashboard => "/dashboard",
            Route::Chat => "/chat",
            Route::Policy => "/policy",
            Route::Coverage => "/coverage",
            Route::Providers => "/providers",
            Route::Telemedicine => "/telemedicine",
            Route::Prescriptions => "/prescriptions",
            Route::Support => "/support",
            Route::Booking => "/booking",
            Route::TelemedicineBooking => "/telemedicine-booking",
            Route::TelemedicineCall => "/telemedicine-call",
        }
    }

    /// Resolve a path to a route. Unknown paths yield `None`.
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Apply the authentication guard.
    ///
    /// Signed-out users are sent to `/auth` from every other screen; signed-in
    /// users visiting `/auth` are sent to `/dashboard`.
    pub fn guard(self, authenticated: bool) -> Route {
        match (self, authenticated) {
            (Route::Auth, true) => Route::Dashboard,
            (Route::Auth, false) => Route::Auth,
            (_, false) => Route::Auth,
            (route, true) => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
