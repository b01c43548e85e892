pub(crate) mod brc20;
pub(crate) mod validator;

pub(crate) use self::validator::LedgerValidator;
