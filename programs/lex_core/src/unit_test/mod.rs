pub mod market_state_test;
pub mod math_test;
pub mod oracle_test;
