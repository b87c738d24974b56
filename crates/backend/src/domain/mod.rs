pub mod a003_cost;
