mod support;

mod app_tests;
