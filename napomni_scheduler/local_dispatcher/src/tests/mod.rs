mod delay_tests;
mod dispatcher_tests;
