pub mod games_repository;
pub mod outbox_repository;
pub mod settings_repository;
pub mod submissions_repository;
pub mod users_repository;
