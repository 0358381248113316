//! Database Integration Tests
//!
//! Exercise the `PostgreSQL` queries against a migrated database.
//! Run with: `DATABASE_URL=... cargo test -p parti-server db::tests -- --ignored`

#[cfg(test)]
mod postgres_tests {
    use super::super::*;
    use chrono::{Duration, Utc};
    use parti_common::{EventStatus, Role, SubscriptionTier};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            description: Some("Sunset session".to_string()),
            date_time: Utc::now() + Duration::days(3),
            location_name: "Playa de las Americas".to_string(),
            image_url: None,
            category_id: None,
            min_tier_required: SubscriptionTier::Basic,
        }
    }

    // ========================================================================
    // Account / Profile Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_create_account_creates_basic_profile(pool: PgPool) {
        let (account, profile) =
            create_account(&pool, "agent@parti.life", "hash", Some("Agent"), Role::Agent)
                .await
                .expect("Failed to create account");

        assert_eq!(account.id, profile.id);
        assert_eq!(profile.role, Role::Agent);
        assert_eq!(profile.subscription_tier, SubscriptionTier::Basic);
        assert_eq!(profile.full_name.as_deref(), Some("Agent"));

        let found = find_account_by_email(&pool, "AGENT@parti.life")
            .await
            .expect("Query failed")
            .expect("Account not found");
        assert_eq!(found.id, account.id);
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_email_uniqueness_is_case_insensitive(pool: PgPool) {
        create_account(&pool, "dup@parti.life", "hash", None, Role::User)
            .await
            .expect("Failed to create first account");

        let result = create_account(&pool, "DUP@parti.life", "hash", None, Role::User).await;
        assert!(result.is_err(), "Should fail on duplicate email");
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_update_role_and_tier(pool: PgPool) {
        let (_, profile) = create_account(&pool, "u@parti.life", "hash", None, Role::User)
            .await
            .unwrap();

        let updated = update_profile_role(&pool, profile.id, Role::Admin)
            .await
            .unwrap()
            .expect("profile exists");
        assert_eq!(updated.role, Role::Admin);

        let updated = update_profile_tier(&pool, profile.id, SubscriptionTier::Vip)
            .await
            .unwrap()
            .expect("profile exists");
        assert_eq!(updated.subscription_tier, SubscriptionTier::Vip);
        assert_eq!(updated.role, Role::Admin);

        let missing = update_profile_role(&pool, Uuid::now_v7(), Role::Admin)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_set_role_by_email(pool: PgPool) {
        create_account(&pool, "boss@parti.life", "hash", None, Role::User)
            .await
            .unwrap();

        let promoted = set_role_by_email(&pool, "Boss@Parti.life", Role::Admin)
            .await
            .unwrap()
            .expect("account exists");
        assert_eq!(promoted.role, Role::Admin);

        let none = set_role_by_email(&pool, "nobody@parti.life", Role::Admin)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    // ========================================================================
    // Event Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_event_lifecycle(pool: PgPool) {
        let (_, agent) = create_account(&pool, "a@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();

        let event = insert_event(
            &pool,
            &NewEvent {
                draft: draft("Full Moon Party"),
                created_by: agent.id,
                status: EventStatus::Pending,
            },
        )
        .await
        .unwrap();
        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.created_by, agent.id);

        // Compare-and-swap only succeeds from the expected state
        let approved =
            transition_event_status(&pool, event.id, EventStatus::Pending, EventStatus::Approved)
                .await
                .unwrap()
                .expect("pending -> approved");
        assert_eq!(approved.status, EventStatus::Approved);

        let lost_race =
            transition_event_status(&pool, event.id, EventStatus::Pending, EventStatus::Rejected)
                .await
                .unwrap();
        assert!(lost_race.is_none());

        // Edit without forced status keeps it
        let edited = update_event(
            &pool,
            event.id,
            &EventPatch {
                draft: draft("Full Moon Party (updated)"),
                status: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(edited.status, EventStatus::Approved);
        assert_eq!(edited.title, "Full Moon Party (updated)");

        // Edit with forced status resets it
        let edited = update_event(
            &pool,
            event.id,
            &EventPatch {
                draft: draft("Full Moon Party"),
                status: Some(EventStatus::Pending),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(edited.status, EventStatus::Pending);

        assert!(delete_event(&pool, event.id).await.unwrap());
        assert!(!delete_event(&pool, event.id).await.unwrap());
        assert!(find_event_by_id(&pool, event.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_created_by_is_immutable(pool: PgPool) {
        let (_, a) = create_account(&pool, "a@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();
        let (_, b) = create_account(&pool, "b@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();
        let event = insert_event(
            &pool,
            &NewEvent {
                draft: draft("Owned"),
                created_by: a.id,
                status: EventStatus::Pending,
            },
        )
        .await
        .unwrap();

        let result = sqlx::query("UPDATE events SET created_by = $1 WHERE id = $2")
            .bind(b.id)
            .bind(event.id)
            .execute(&pool)
            .await;
        assert!(result.is_err(), "trigger must reject owner change");
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_find_events_filter_and_order(pool: PgPool) {
        let (_, agent) = create_account(&pool, "a@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();

        let mut later = draft("Later");
        later.date_time = Utc::now() + Duration::days(10);
        let mut sooner = draft("Sooner");
        sooner.date_time = Utc::now() + Duration::days(1);
        let mut past = draft("Past");
        past.date_time = Utc::now() - Duration::days(1);

        for (d, status) in [
            (later, EventStatus::Approved),
            (sooner, EventStatus::Approved),
            (past, EventStatus::Approved),
            (draft("Pending"), EventStatus::Pending),
        ] {
            insert_event(
                &pool,
                &NewEvent {
                    draft: d,
                    created_by: agent.id,
                    status,
                },
            )
            .await
            .unwrap();
        }

        let upcoming = find_events(
            &pool,
            &EventFilter {
                status: Some(EventStatus::Approved),
                starts_at_or_after: Some(Utc::now()),
                ..EventFilter::default()
            },
            EventOrder::DateTimeAsc,
        )
        .await
        .unwrap();

        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);

        let mine = find_events(
            &pool,
            &EventFilter {
                created_by: Some(agent.id),
                ..EventFilter::default()
            },
            EventOrder::CreatedAtDesc,
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 4);
    }

    // ========================================================================
    // Venue Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_venue_crud(pool: PgPool) {
        let venue = insert_venue(
            &pool,
            &VenueDraft {
                name: "Papagayo".to_string(),
                category: "Beach Club".to_string(),
                location: "Playa de las Americas".to_string(),
                description: None,
                image_url: None,
                rating: Some(4.5),
                capacity: Some(1200),
                is_open: true,
            },
        )
        .await
        .unwrap();

        let mut draft = VenueDraft {
            name: "Papagayo Beach Club".to_string(),
            category: venue.category.clone(),
            location: venue.location.clone(),
            description: Some("Iconic".to_string()),
            image_url: None,
            rating: venue.rating,
            capacity: venue.capacity,
            is_open: false,
        };
        let updated = update_venue(&pool, venue.id, &draft).await.unwrap().unwrap();
        assert_eq!(updated.name, "Papagayo Beach Club");
        assert!(!updated.is_open);

        draft.rating = Some(9.0);
        assert!(
            update_venue(&pool, venue.id, &draft).await.is_err(),
            "rating is bounded to 0..=5"
        );

        assert_eq!(list_venues(&pool).await.unwrap().len(), 1);
        assert!(delete_venue(&pool, venue.id).await.unwrap());
        assert!(find_venue_by_id(&pool, venue.id).await.unwrap().is_none());
    }
}
