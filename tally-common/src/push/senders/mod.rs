mod fcm;
mod mock_sender;

pub use fcm::FcmSender;
pub use mock_sender::MockSender;
