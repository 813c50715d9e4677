use super::*;
use crate::test_utils::{arb_box, at, date, seed_item, setup_test_db};
use proptest::prelude::*;

/// (owner index, due-date offset from the as-of date, box, suspended)
fn arb_seed() -> impl Strategy<Value = (usize, i64, i32, bool)> {
    (0usize..2, -30i64..30, arb_box(), prop::bool::weighted(0.2))
}

// ============================================================================
// Q1: Queue Shape Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Q1.1: the queue is sorted by due date, never exceeds the limit, and only
    /// holds the owner's active items that are due
    #[test]
    fn prop_q1_1_queue_is_sorted_bounded_and_scoped(
        seeds in prop::collection::vec(arb_seed(), 0..25),
        limit in 0usize..30,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let pool = setup_test_db();
            let as_of = date(2024, 6, 15);
            let owners = ["learner-a", "learner-b"];

            let mut eligible = 0usize;
            for (i, (owner, offset, box_number, suspended)) in seeds.iter().enumerate() {
                let due = as_of + chrono::Duration::days(*offset);
                let item = seed_item(&pool, owners[*owner], None, &format!("src-{}", i), at(2024, 1, 1), *box_number, due).await;
                if *suspended {
                    crate::repo::set_review_item_status(&pool, owners[*owner], &item.get_id(), ItemStatus::Suspended)
                        .await
                        .unwrap();
                } else if *owner == 0 && due <= as_of {
                    eligible += 1;
                }
            }

            let queue = build_queue(&pool, owners[0], &QueueFilter::All, as_of, limit).unwrap();

            assert_eq!(queue.len(), eligible.min(limit));
            for item in &queue {
                assert_eq!(item.get_owner_id(), owners[0]);
                assert!(item.is_active());
                assert!(item.get_next_review_at() <= as_of);
            }
            for pair in queue.windows(2) {
                assert!(pair[0].get_next_review_at() <= pair[1].get_next_review_at());
            }
        });
    }

    /// Q1.2: the three due-state counts always partition the active total
    #[test]
    fn prop_q1_2_counts_partition_total(
        seeds in prop::collection::vec(arb_seed(), 0..25),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let pool = setup_test_db();
            let as_of = date(2024, 6, 15);

            let mut active = 0i64;
            for (i, (_, offset, box_number, suspended)) in seeds.iter().enumerate() {
                let due = as_of + chrono::Duration::days(*offset);
                let item = seed_item(&pool, "learner-a", None, &format!("src-{}", i), at(2024, 1, 1), *box_number, due).await;
                if *suspended {
                    crate::repo::set_review_item_status(&pool, "learner-a", &item.get_id(), ItemStatus::Suspended)
                        .await
                        .unwrap();
                } else {
                    active += 1;
                }
            }

            let counts = get_review_summary_counts(&pool, "learner-a", as_of).unwrap();

            assert_eq!(counts.total_active, active);
            assert_eq!(counts.overdue_count + counts.today_count + counts.upcoming_count, counts.total_active);
        });
    }
}
