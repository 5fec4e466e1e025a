pub mod api_dto;
pub mod settings_dto;
pub mod sync_dto;
pub mod vacancy_dto;
