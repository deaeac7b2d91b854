mod clock;

mod test_common_validation;
