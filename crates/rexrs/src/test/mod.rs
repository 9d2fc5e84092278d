mod test_captures;
mod test_compile;
mod test_consumers;
mod test_parse;
mod test_vm;
