/*
 * Responsibility
 * - typed request pieces handlers take instead of raw Path/Query/extensions
 * - rejections use AppError so they render the JSON envelope
 */
mod json_body;
mod pagination;
mod path_id;
mod principal;

pub use json_body::JsonBody;
pub use pagination::Pagination;
pub use path_id::PathId;
pub use principal::CurrentPrincipal;
