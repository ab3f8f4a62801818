//! Ledger behaviour against the in-memory store.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use quest_core::error::CoreError;
use quest_core::events::{
    EVENT_ACHIEVEMENT_AWARDED, EVENT_ACHIEVEMENT_CREATED, EVENT_REWARD_CREATED,
    EVENT_REWARD_PURCHASED,
};
use quest_core::level::level_for;
use quest_core::transaction::TransactionKind;
use quest_core::validation::MAX_AWARD;
use quest_db::models::achievement::{Achievement, CreateAchievement};
use quest_db::models::reward::{CreateReward, Reward};
use quest_db::models::user::User;
use quest_events::{EventPublisher, QuestEvent};
use quest_ledger::{
    AchievementGrant, Actor, LedgerEngine, LedgerError, LedgerStore, MemoryLedgerStore,
};

const ADMIN: Actor = Actor {
    user_id: 1_000,
    is_admin: true,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<QuestEvent>>);

impl EventPublisher for Recorder {
    fn publish(&self, event: QuestEvent) {
        self.0.lock().unwrap().push(event);
    }
}

impl Recorder {
    fn names(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

struct Harness {
    engine: LedgerEngine,
    store: Arc<MemoryLedgerStore>,
    events: Arc<Recorder>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let events = Arc::new(Recorder::default());
        let engine = LedgerEngine::new(store.clone(), events.clone());
        Self {
            engine,
            store,
            events,
        }
    }

    async fn employee(&self, points: i64, total: i64) -> User {
        self.store
            .insert_user("john@example.com", "John Smith", "employee", points, total)
            .await
    }

    async fn achievement(&self, title: &str, points_reward: i64) -> Achievement {
        self.engine
            .create_achievement(
                ADMIN,
                &CreateAchievement {
                    title: title.into(),
                    description: format!("{title} description"),
                    icon: None,
                    points_reward,
                    category: None,
                },
            )
            .await
            .unwrap()
    }

    async fn reward(&self, title: &str, points_cost: i64, stock: i32) -> Reward {
        self.engine
            .create_reward(
                ADMIN,
                &CreateReward {
                    title: title.into(),
                    description: format!("{title} description"),
                    icon: None,
                    points_cost,
                    category: None,
                    stock: Some(stock),
                    image_url: None,
                },
            )
            .await
            .unwrap()
    }

    async fn user(&self, id: i64) -> User {
        self.engine.user(id).await.unwrap()
    }
}

// ---------------------------------------------------------------------------
// Level and earnings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn level_tracks_lifetime_earnings() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    assert_eq!(user.level, 1);

    for (amount, reason) in [(99, "almost"), (1, "level up"), (-40, "late"), (250, "demo")] {
        let receipt = h
            .engine
            .award_points(ADMIN, user.id, amount, reason)
            .await
            .unwrap();
        assert_eq!(receipt.user.level, level_for(receipt.user.total_points_earned));
        assert!(receipt.user.level >= 1);
    }

    let user = h.user(user.id).await;
    assert_eq!(user.total_points_earned, 350);
    assert_eq!(user.points, 310);
    assert_eq!(user.level, 4);
}

#[tokio::test]
async fn deduction_lowers_balance_only() {
    let h = Harness::new();
    let user = h.employee(100, 100).await;

    let receipt = h
        .engine
        .award_points(ADMIN, user.id, -50, "policy violation")
        .await
        .unwrap();

    assert_eq!(receipt.user.points, 50);
    assert_eq!(receipt.user.total_points_earned, 100);
    assert_eq!(receipt.user.level, 2);
    assert_eq!(receipt.transaction.amount, -50);
    assert_eq!(receipt.transaction.kind, TransactionKind::AdminAward.as_str());
    assert_eq!(receipt.transaction.description, "policy violation");
    assert_eq!(receipt.transaction.actor_id, Some(ADMIN.user_id));
}

#[tokio::test]
async fn deduction_may_overdraw() {
    let h = Harness::new();
    let user = h.employee(30, 30).await;
    let receipt = h
        .engine
        .award_points(ADMIN, user.id, -50, "equipment damage")
        .await
        .unwrap();
    assert_eq!(receipt.user.points, -20);
}

#[tokio::test]
async fn award_to_unknown_user_is_not_found() {
    let h = Harness::new();
    assert_matches!(
        h.engine.award_points(ADMIN, 4242, 10, "ghost").await,
        Err(LedgerError::Core(CoreError::NotFound { entity: "User", .. }))
    );
}

#[tokio::test]
async fn oversized_award_is_rejected_without_writes() {
    let h = Harness::new();
    let user = h.employee(40, 40).await;

    for amount in [i64::MAX, i64::MIN, MAX_AWARD + 1] {
        assert_matches!(
            h.engine.award_points(ADMIN, user.id, amount, "bonus").await,
            Err(LedgerError::Core(CoreError::Validation(_)))
        );
    }

    assert_eq!(h.user(user.id).await.points, 40);
    assert_eq!(h.store.transaction_count(user.id).await, 0);
    assert!(h.events.names().is_empty());
}

#[tokio::test]
async fn balance_overflow_is_a_decline() {
    let h = Harness::new();
    let rich = h
        .store
        .insert_user("rich@example.com", "Rich", "employee", i64::MAX - 10, 0)
        .await;

    let err = h
        .engine
        .award_points(ADMIN, rich.id, MAX_AWARD, "bonus")
        .await
        .unwrap_err();
    assert!(err.is_declined());
    assert_matches!(err, LedgerError::Core(CoreError::Validation(_)));

    let after = h.user(rich.id).await;
    assert_eq!(after.points, i64::MAX - 10);
    assert_eq!(h.store.transaction_count(rich.id).await, 0);
}

#[tokio::test]
async fn level_beyond_integer_range_is_a_decline() {
    let h = Harness::new();
    let top = (i32::MAX as i64 - 1) * 100;
    let veteran = h
        .store
        .insert_user("vet@example.com", "Veteran", "employee", 0, top)
        .await;
    assert_eq!(veteran.level, i32::MAX);

    // A deduction leaves lifetime earnings alone, so it still succeeds.
    h.engine
        .award_points(ADMIN, veteran.id, -10, "adjustment")
        .await
        .unwrap();

    assert_matches!(
        h.engine.award_points(ADMIN, veteran.id, 100, "bonus").await,
        Err(LedgerError::Core(CoreError::Validation(_)))
    );
    let after = h.user(veteran.id).await;
    assert_eq!(after.total_points_earned, top);
    assert_eq!(after.points, -10);
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

#[tokio::test]
async fn achievement_unlock_scenario() {
    let h = Harness::new();
    let user = h.employee(450, 1250).await;
    assert_eq!(user.level, 13);
    let achievement = h.achievement("Team Player", 100).await;

    let grant = h
        .engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();
    let receipt = assert_matches!(grant, AchievementGrant::Unlocked(r) => r);

    assert_eq!(receipt.user.points, 550);
    assert_eq!(receipt.user.total_points_earned, 1350);
    assert_eq!(receipt.user.level, 14);
    assert_eq!(receipt.transaction.amount, 100);
    assert_eq!(receipt.transaction.kind, "achievement");
    assert_eq!(receipt.transaction.description, "Achievement unlocked: Team Player");
    assert_eq!(h.store.unlock_count(user.id, achievement.id).await, 1);
    assert_eq!(h.store.transaction_count(user.id).await, 1);
}

#[tokio::test]
async fn double_grant_credits_once() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    let achievement = h.achievement("First Steps", 50).await;

    let first = h
        .engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();
    let second = h
        .engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();

    assert_matches!(first, AchievementGrant::Unlocked(_));
    assert_matches!(second, AchievementGrant::AlreadyUnlocked);
    assert_eq!(h.store.unlock_count(user.id, achievement.id).await, 1);
    assert_eq!(h.store.transaction_count(user.id).await, 1);
    assert_eq!(h.user(user.id).await.points, 50);
}

#[tokio::test]
async fn concurrent_grants_credit_once() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    let achievement = h.achievement("Speed Demon", 75).await;

    let (a, b) = futures::join!(
        h.engine.award_achievement(ADMIN, user.id, achievement.id),
        h.engine.award_achievement(ADMIN, user.id, achievement.id),
    );
    let unlocked = [a.unwrap(), b.unwrap()]
        .into_iter()
        .filter(|g| matches!(g, AchievementGrant::Unlocked(_)))
        .count();

    assert_eq!(unlocked, 1);
    assert_eq!(h.user(user.id).await.points, 75);
}

#[tokio::test]
async fn inactive_or_unknown_achievement_is_skipped() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    let achievement = h.achievement("Perfect Month", 300).await;
    h.engine
        .delete_achievement(ADMIN, achievement.id)
        .await
        .unwrap();
    h.events.clear();

    assert_matches!(
        h.engine
            .award_achievement(ADMIN, user.id, achievement.id)
            .await,
        Ok(AchievementGrant::Skipped)
    );
    assert_matches!(
        h.engine.award_achievement(ADMIN, user.id, 9999).await,
        Ok(AchievementGrant::Skipped)
    );
    assert_eq!(h.user(user.id).await.points, 0);
    assert!(h.events.names().is_empty());
}

// ---------------------------------------------------------------------------
// Redemptions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn redemption_moves_exact_amounts() {
    let h = Harness::new();
    let user = h.employee(800, 1000).await;
    let reward = h.reward("Premium Parking Spot", 300, 5).await;

    let receipt = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();

    assert_eq!(receipt.user.points, 500);
    assert_eq!(receipt.user.total_points_earned, 1000);
    assert_eq!(receipt.user.level, 11);
    assert_eq!(receipt.reward.stock, 4);
    assert_eq!(receipt.redemption.status, "pending");
    assert_eq!(receipt.redemption.points_spent, 300);
    assert_eq!(receipt.transaction.amount, -300);
    assert_eq!(receipt.transaction.kind, "redemption");
    assert_eq!(h.store.transaction_count(user.id).await, 1);
}

#[tokio::test]
async fn insufficient_balance_changes_nothing() {
    let h = Harness::new();
    let user = h.employee(200, 200).await;
    let reward = h.reward("Extra Day Off", 500, 20).await;
    h.events.clear();

    let result = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await;

    assert_matches!(
        result,
        Err(LedgerError::Core(CoreError::InsufficientBalance {
            required: 500,
            available: 200
        }))
    );
    assert_eq!(h.user(user.id).await.points, 200);
    assert_eq!(h.store.find_reward(reward.id).await.unwrap().stock, 20);
    assert!(h
        .engine
        .user_redemptions(ADMIN, user.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(h.store.transaction_count(user.id).await, 0);
    assert!(h.events.names().is_empty());
}

#[tokio::test]
async fn out_of_stock_changes_nothing() {
    let h = Harness::new();
    let user = h.employee(1000, 1000).await;
    let reward = h.reward("Team Lunch", 250, 0).await;

    assert_matches!(
        h.engine
            .redeem_reward(Actor::employee(user.id), user.id, reward.id)
            .await,
        Err(LedgerError::Core(CoreError::OutOfStock { .. }))
    );
    assert_eq!(h.user(user.id).await.points, 1000);
    assert_eq!(h.store.transaction_count(user.id).await, 0);
}

#[tokio::test]
async fn deleted_reward_cannot_be_redeemed() {
    let h = Harness::new();
    let user = h.employee(1000, 1000).await;
    let reward = h.reward("Coffee Shop Gift Card", 200, 999).await;
    h.engine.delete_reward(ADMIN, reward.id).await.unwrap();

    assert_matches!(
        h.engine
            .redeem_reward(Actor::employee(user.id), user.id, reward.id)
            .await,
        Err(LedgerError::Core(CoreError::NotFound { entity: "Reward", .. }))
    );
}

#[tokio::test]
async fn employee_cannot_redeem_for_someone_else() {
    let h = Harness::new();
    let user = h.employee(1000, 1000).await;
    let reward = h.reward("Team Lunch", 250, 10).await;

    assert_matches!(
        h.engine
            .redeem_reward(Actor::employee(user.id + 100), user.id, reward.id)
            .await,
        Err(LedgerError::Core(CoreError::Forbidden(_)))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redemption_of_last_unit() {
    let h = Harness::new();
    let alice = h
        .store
        .insert_user("alice@example.com", "Alice", "employee", 1000, 1000)
        .await;
    let bob = h
        .store
        .insert_user("bob@example.com", "Bob", "employee", 1000, 1000)
        .await;
    let reward_id = h.reward("Noise-Cancelling Headphones", 400, 1).await.id;

    let engine_a = h.engine.clone();
    let engine_b = h.engine.clone();
    let a = tokio::spawn(async move {
        engine_a
            .redeem_reward(Actor::employee(alice.id), alice.id, reward_id)
            .await
    });
    let b = tokio::spawn(async move {
        engine_b
            .redeem_reward(Actor::employee(bob.id), bob.id, reward_id)
            .await
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(LedgerError::Core(CoreError::OutOfStock { .. })))));
    assert_eq!(h.store.find_reward(reward_id).await.unwrap().stock, 0);
}

#[tokio::test]
async fn concurrent_redemptions_cannot_overspend() {
    let h = Harness::new();
    let user = h.employee(500, 500).await;
    let reward = h.reward("Work From Home Week", 250, 15).await;

    let attempts = (0..5).map(|_| {
        h.engine
            .redeem_reward(Actor::employee(user.id), user.id, reward.id)
    });
    let results = futures::future::join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    assert_eq!(h.user(user.id).await.points, 0);
    assert_eq!(h.store.find_reward(reward.id).await.unwrap().stock, 13);
}

#[tokio::test]
async fn catalog_prices_are_bounded() {
    let h = Harness::new();
    let reward = CreateReward {
        title: "Private Island".into(),
        description: String::new(),
        icon: None,
        points_cost: MAX_AWARD + 1,
        category: None,
        stock: None,
        image_url: None,
    };
    assert_matches!(
        h.engine.create_reward(ADMIN, &reward).await,
        Err(LedgerError::Core(CoreError::Validation(msg))) if msg.contains("points_cost")
    );

    let achievement = CreateAchievement {
        title: "Legend".into(),
        description: String::new(),
        icon: None,
        points_reward: MAX_AWARD + 1,
        category: None,
    };
    assert_matches!(
        h.engine.create_achievement(ADMIN, &achievement).await,
        Err(LedgerError::Core(CoreError::Validation(msg))) if msg.contains("points_reward")
    );
    assert!(h.events.names().is_empty());
}

// ---------------------------------------------------------------------------
// Redemption lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fulfilment_stamps_actor() {
    let h = Harness::new();
    let user = h.employee(500, 500).await;
    let reward = h.reward("Team Lunch", 250, 10).await;
    let receipt = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();

    let approved = h
        .engine
        .update_redemption_status(ADMIN, receipt.redemption.id, "approved", Some("Friday"))
        .await
        .unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.fulfilled_at, None);

    let fulfilled = h
        .engine
        .update_redemption_status(ADMIN, receipt.redemption.id, "fulfilled", None)
        .await
        .unwrap();
    assert_eq!(fulfilled.status, "fulfilled");
    assert!(fulfilled.fulfilled_at.is_some());
    assert_eq!(fulfilled.fulfilled_by, Some(ADMIN.user_id));
    assert_eq!(fulfilled.notes.as_deref(), Some("Friday"));
}

#[tokio::test]
async fn terminal_states_are_final() {
    let h = Harness::new();
    let user = h.employee(500, 500).await;
    let reward = h.reward("Team Lunch", 250, 10).await;
    let receipt = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();
    let id = receipt.redemption.id;

    h.engine
        .update_redemption_status(ADMIN, id, "rejected", Some("Not this quarter"))
        .await
        .unwrap();

    for next in ["pending", "approved", "fulfilled", "rejected"] {
        assert_matches!(
            h.engine.update_redemption_status(ADMIN, id, next, None).await,
            Err(LedgerError::Core(CoreError::InvalidTransition { .. }))
        );
    }
}

#[tokio::test]
async fn employee_cannot_change_status() {
    let h = Harness::new();
    let user = h.employee(500, 500).await;
    let reward = h.reward("Team Lunch", 250, 10).await;
    let receipt = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();

    assert_matches!(
        h.engine
            .update_redemption_status(Actor::employee(user.id), receipt.redemption.id, "fulfilled", None)
            .await,
        Err(LedgerError::Core(CoreError::Forbidden(_)))
    );
}

#[tokio::test]
async fn admin_lists_by_status() {
    let h = Harness::new();
    let user = h.employee(1000, 1000).await;
    let reward = h.reward("Team Lunch", 250, 10).await;
    for _ in 0..3 {
        h.engine
            .redeem_reward(Actor::employee(user.id), user.id, reward.id)
            .await
            .unwrap();
    }
    let all = h.engine.redemptions(ADMIN, None, None, None).await.unwrap();
    h.engine
        .update_redemption_status(ADMIN, all[0].id, "approved", None)
        .await
        .unwrap();

    let pending = h
        .engine
        .redemptions(ADMIN, Some("pending"), None, None)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert_matches!(
        h.engine.redemptions(ADMIN, Some("lost"), None, None).await,
        Err(LedgerError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Transaction log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_mutation_appends_one_entry() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    let achievement = h.achievement("Innovation Star", 200).await;
    let reward = h.reward("Team Lunch", 250, 10).await;
    let before = h.store.transaction_count(user.id).await;

    h.engine
        .award_points(ADMIN, user.id, 100, "onboarding")
        .await
        .unwrap();
    h.engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();
    h.engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();
    h.engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();
    let _ = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await;

    assert_eq!(h.store.transaction_count(user.id).await, before + 3);

    let history = h
        .engine
        .transactions(Actor::employee(user.id), user.id, None)
        .await
        .unwrap();
    let amounts: Vec<i64> = history.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![-250, 200, 100]);
}

#[tokio::test]
async fn history_is_capped() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    for i in 0..60 {
        h.engine
            .award_points(ADMIN, user.id, 1, &format!("tick {i}"))
            .await
            .unwrap();
    }

    let history = h
        .engine
        .transactions(ADMIN, user.id, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 50);
    assert_eq!(history[0].description, "tick 59");

    let short = h
        .engine
        .transactions(ADMIN, user.id, Some(5))
        .await
        .unwrap();
    assert_eq!(short.len(), 5);
}

// ---------------------------------------------------------------------------
// Leaderboard and events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaderboard_excludes_admins_and_breaks_ties_by_id() {
    let h = Harness::new();
    h.store
        .insert_user("admin@example.com", "Admin", "admin", 0, 9000)
        .await;
    let a = h
        .store
        .insert_user("a@example.com", "A", "employee", 0, 500)
        .await;
    let b = h
        .store
        .insert_user("b@example.com", "B", "employee", 0, 900)
        .await;
    let c = h
        .store
        .insert_user("c@example.com", "C", "employee", 0, 500)
        .await;

    let board = h.engine.leaderboard(None).await.unwrap();
    let ids: Vec<i64> = board.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![b.id, a.id, c.id]);
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[2].rank, 3);

    let top = h.engine.leaderboard(Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn events_follow_successful_mutations() {
    let h = Harness::new();
    let user = h.employee(300, 300).await;
    let achievement = h.achievement("Team Player", 100).await;
    let reward = h.reward("Team Lunch", 250, 10).await;

    h.engine
        .award_achievement(ADMIN, user.id, achievement.id)
        .await
        .unwrap();
    h.engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await
        .unwrap();
    let _ = h
        .engine
        .redeem_reward(Actor::employee(user.id), user.id, reward.id)
        .await;

    assert_eq!(
        h.events.names(),
        vec![
            EVENT_ACHIEVEMENT_CREATED,
            EVENT_REWARD_CREATED,
            EVENT_ACHIEVEMENT_AWARDED,
            EVENT_REWARD_PURCHASED,
        ]
    );
    let events = h.events.0.lock().unwrap();
    assert_eq!(events[3].celebration.as_deref(), Some("Team Lunch redeemed!"));
    assert_eq!(events[3].subject_user_id, Some(user.id));
}

#[tokio::test]
async fn deleting_a_user_removes_their_ledger() {
    let h = Harness::new();
    let user = h.employee(0, 0).await;
    h.engine
        .award_points(ADMIN, user.id, 10, "welcome")
        .await
        .unwrap();

    h.engine.delete_user(ADMIN, user.id).await.unwrap();

    assert_matches!(
        h.engine.user(user.id).await,
        Err(LedgerError::Core(CoreError::NotFound { .. }))
    );
    assert_eq!(h.store.transaction_count(user.id).await, 0);
    assert!(h.store.find_user(user.id).await.unwrap().is_none());
    assert_matches!(
        h.engine.delete_user(ADMIN, user.id).await,
        Err(LedgerError::Core(CoreError::NotFound { .. }))
    );
}
