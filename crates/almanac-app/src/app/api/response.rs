//! Status-carrying response wrappers.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Response, Scribe};
use serde::Serialize;

/// Renders `201 Created` with a JSON body.
pub struct Created<T>(pub T);

impl<T: Serialize + Send> Scribe for Created<T> {
    fn render(self, res: &mut Response) {
        res.status_code(StatusCode::CREATED);
        res.render(Json(self.0));
    }
}

/// Renders `204 No Content`.
pub struct NoContent;

impl Scribe for NoContent {
    fn render(self, res: &mut Response) {
        res.status_code(StatusCode::NO_CONTENT);
    }
}
