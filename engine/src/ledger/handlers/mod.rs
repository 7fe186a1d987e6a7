mod accounts;
mod arcade;
mod billing;
mod drops;
mod engagement;
