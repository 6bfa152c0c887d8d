#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod data_source_registrar;
pub mod google_fit_client;
pub mod google_fit_types;
pub mod google_oauth;
pub mod weight_importer;
