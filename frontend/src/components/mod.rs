pub mod dialog;
pub mod filter_bar;
pub mod record_card;
pub mod record_form;
pub mod view;
