pub mod allocation_service;
pub mod calculation_service;
pub mod registry_service;
