pub mod db_pool;
pub mod executor;
