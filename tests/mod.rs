mod bulk_tests;
mod support;
mod template_tests;
