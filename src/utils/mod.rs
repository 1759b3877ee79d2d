pub mod fuzzy;
