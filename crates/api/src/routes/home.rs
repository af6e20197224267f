//! Index Route

use axum::response::Html;

/// Route listing served at `/`
pub const HELP_TEXT: &str = "Welcome to the climate observation API!<br/>\
Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/date/2016-08-14<br/>\
/api/v1.0/date/2016-08-14/2016-09-01<br/>";

pub async fn index() -> Html<&'static str> {
    crate::metrics::record_request("index");
    Html(HELP_TEXT)
}
