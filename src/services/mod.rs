pub mod user_service;
pub mod favorite_service;
pub mod alert_service;
pub mod weather_service;
pub mod email_service;

pub use user_service::UserService;
pub use favorite_service::FavoriteService;
pub use alert_service::AlertService;
pub use weather_service::WeatherService;
pub use email_service::EmailService;
