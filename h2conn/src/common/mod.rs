pub(crate) mod conf;
