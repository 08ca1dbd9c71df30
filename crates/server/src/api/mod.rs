mod handlers;
mod orders;
mod routes;

pub use routes::create_router;
