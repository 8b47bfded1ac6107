pub mod appointment;
pub mod article;
pub mod doctor;
pub mod enums;
pub mod notification;
pub mod poli;
pub mod user;

pub use appointment::*;
pub use article::*;
pub use doctor::*;
pub use enums::*;
pub use notification::*;
pub use poli::*;
pub use user::*;
