pub mod event;
pub mod export;
pub mod facility;
pub mod goal;
pub mod notification;
pub mod progress;
