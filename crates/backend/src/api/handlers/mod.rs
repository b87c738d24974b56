// Dashboard handlers
pub mod d100_finance;
