pub mod ai;
pub mod category;
pub mod contact_me;
pub mod image;
pub mod option_fields;
pub mod token;
