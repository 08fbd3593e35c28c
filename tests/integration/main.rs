mod monitoring_test;
mod store_test;
