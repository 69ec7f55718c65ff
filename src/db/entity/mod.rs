pub mod user;
pub mod favorite_city;
pub mod alert_preference;
pub mod alert_event;

pub use user::Entity as User;
pub use favorite_city::Entity as FavoriteCity;
pub use alert_preference::Entity as AlertPreference;
pub use alert_event::Entity as AlertEvent;
