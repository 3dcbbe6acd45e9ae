pub mod db_utils;
pub mod identification_cache;
pub mod identification_filter;
