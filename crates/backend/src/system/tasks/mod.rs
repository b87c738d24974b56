pub mod recurring_costs;
