pub mod capture;
pub mod handler;
pub mod interactive;
pub mod mode;

pub use handler::AppHandler;
pub use mode::Mode;
