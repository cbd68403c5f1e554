pub mod profit_cycle_sync;
