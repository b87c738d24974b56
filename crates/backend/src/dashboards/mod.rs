pub mod d100_finance;
