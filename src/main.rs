use kiln_common::{
    alloc::{primitives::Mallocator, composable::{BudgetAllocator, TrackingAllocator}},
    prelude::*,
};
use kiln_logging::{log_error, log_info, set_logger, LogCategory, LogLevel, Logger, LoggerConfig};

pub const LOG_CAT : LogCategory = LogCategory::new("Main");

static LOGGER : Logger = Logger::new();

fn main() {
    LOGGER.configure(LoggerConfig { max_level: LogLevel::Debug, ..LoggerConfig::default() });
    set_logger(&LOGGER);

    walk_through();
    growth_statistics();
    allocation_failure();

    LOGGER.flush();
}

/// Push, insert, remove, resize and clear a dynamic array, logging its state after every step.
fn walk_through() {
    let mut arr = DynArr::new();
    arr.push(1);
    arr.push(2);
    arr.push(3);
    log_info!(LOG_CAT, "after pushes:  {arr:?} (len {}, capacity {})", arr.len(), arr.capacity());

    arr.insert_at(arr.begin() + 1, 9);
    log_info!(LOG_CAT, "after insert:  {arr:?}");

    arr.remove_at(arr.begin());
    log_info!(LOG_CAT, "after remove:  {arr:?}");

    arr.resize(5);
    log_info!(LOG_CAT, "after resize:  {arr:?} (capacity {})", arr.capacity());

    let reversed: DynArr<i32> = arr.walk_rev().copied().collect();
    log_info!(LOG_CAT, "reversed:      {reversed:?}");

    arr.clear();
    log_info!(LOG_CAT, "after clear:   len {}, capacity {}", arr.len(), arr.capacity());

    let fixed = FixedArr::from([4, 5, 6]);
    log_info!(LOG_CAT, "fixed array:   {:?} walked back to front", fixed.walk_rev().collect::<DynArr<_>>());
}

/// Show how few reallocations a long run of pushes needs.
fn growth_statistics() {
    let alloc = TrackingAllocator::new(Mallocator);
    let stats = alloc.stats().clone();

    let mut arr = DynArr::new_in(alloc);
    for i in 0..100_000u32 {
        arr.push(i);
    }
    log_info!(LOG_CAT, "100000 pushes: {} allocations, peak of {} bytes", stats.num_allocs(), stats.peak_bytes());
}

/// Show that a failed growth leaves the array as it was.
fn allocation_failure() {
    let mut arr = DynArr::<u64, _>::new_in(BudgetAllocator::new(Mallocator, 64));
    let mut pushed = 0;
    while arr.try_push(pushed).is_ok() {
        pushed += 1;
    }

    match arr.try_push(pushed) {
        Ok(()) => log_info!(LOG_CAT, "unexpectedly grew past the budget"),
        Err(err) => log_error!(LOG_CAT, "{err}, array still holds {arr:?}"),
    }
}
