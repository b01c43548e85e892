pub(crate) mod datastore;
pub(crate) mod protocol;
