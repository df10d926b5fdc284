pub mod generate_form;
pub mod sentence_list;
pub mod worksheet_view;
