//! End-to-end checks of the scheduling core through its public API: generate a
//! schedule, stamp it onto prompts, fold prompts and posts into a calendar, and
//! render each day.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use postcraft_core::{
    build_calendar_in, day_name, generate_schedule, is_valid_schedule_date, next_schedule_date,
    schedule::assign_schedule, short_display, validate, CalendarBuilder, GeneratedPrompt, Post,
    PostStatus, Prompt, ScheduleError,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn stored_prompts(count: usize, start: NaiveDate) -> Vec<Prompt> {
    let generated = (0..count)
        .map(|i| GeneratedPrompt {
            category: "lesson".to_string(),
            hook: format!("Hook {}", i),
            prompt_text: format!("Share lesson number {}", i),
            pillar_number: Some((i % 3) as i32 + 1),
        })
        .collect();
    assign_schedule(generated, Some(start))
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, new)| Prompt {
            id: Uuid::new_v4(),
            category: new.prompt.category,
            hook: new.prompt.hook,
            prompt_text: new.prompt.prompt_text,
            is_used: i % 2 == 1,
            scheduled_date: Some(new.scheduled_date),
            pushed_to_calendar: true,
            pillar_number: new.prompt.pillar_number,
        })
        .collect()
}

fn post_at(status: PostStatus, at: &str) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: "Post".to_string(),
        content: "Body".to_string(),
        status,
        content_type: "text".to_string(),
        posted_at: Some(DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc)),
        created_at: Utc::now(),
    }
}

#[test]
fn generated_dates_hold_weekday_monotonic_and_count_laws() {
    let mut start = ymd(2023, 10, 20);
    for _ in 0..60 {
        for n in [0usize, 1, 2, 3, 7, 25] {
            let dates = generate_schedule(n as i64, Some(start)).unwrap();
            assert_eq!(dates.len(), n);
            if let Some(first) = dates.first() {
                assert_eq!(*first, next_schedule_date(Some(start)).unwrap());
            }
            for pair in dates.windows(2) {
                assert!(pair[0] < pair[1]);
                let gap = (pair[1].date() - pair[0].date()).num_days();
                assert!(gap == 2 || gap == 3);
            }
            for date in &dates {
                assert!(matches!(
                    date.date().weekday(),
                    Weekday::Mon | Weekday::Wed | Weekday::Fri
                ));
                assert!(is_valid_schedule_date(&date.key()));
            }
        }
        start = start + Days::new(1);
    }
}

#[test]
fn negative_count_is_invalid_argument() {
    assert!(matches!(
        generate_schedule(-3, Some(ymd(2024, 1, 15))),
        Err(ScheduleError::InvalidArgument(_))
    ));
}

#[test]
fn validator_and_formatter_examples() {
    assert!(!validate("2024-02-30").valid);
    assert!(validate("2024-01-17").valid);
    assert_eq!(short_display("2024-01-15"), "Mon, Jan 15");
    assert_eq!(day_name("2024-01-17"), "Wednesday");
}

#[test]
fn stamped_prompts_and_posts_fold_into_renderable_days() {
    let prompts = stored_prompts(6, ymd(2024, 1, 15));
    let posts = vec![
        post_at(PostStatus::Used, "2024-01-15T14:00:00Z"),
        post_at(PostStatus::Draft, "2024-01-16T14:00:00Z"),
    ];

    let calendar = build_calendar_in(&prompts, &posts, &Utc);

    assert_eq!(
        calendar.keys().cloned().collect::<Vec<_>>(),
        vec![
            "2024-01-15",
            "2024-01-16",
            "2024-01-17",
            "2024-01-19",
            "2024-01-22",
            "2024-01-24",
            "2024-01-26",
        ]
    );

    let monday = &calendar["2024-01-15"];
    assert!(monday.has_completed_post && monday.has_available_prompt);

    // Every other prompt was marked used.
    assert!(!calendar["2024-01-17"].has_available_prompt);
    assert!(calendar["2024-01-19"].has_available_prompt);

    let labels: Vec<String> = calendar.keys().map(|k| short_display(k)).collect();
    assert_eq!(labels[0], "Mon, Jan 15");
    assert_eq!(labels[1], "Tue, Jan 16");
    assert_eq!(labels[6], "Fri, Jan 26");
}

#[test]
fn builder_order_is_irrelevant_for_generated_data() {
    let prompts = stored_prompts(12, ymd(2024, 3, 1));
    let posts: Vec<Post> = (1..=20)
        .map(|day| {
            let status = if day % 3 == 0 {
                PostStatus::Used
            } else {
                PostStatus::Draft
            };
            post_at(status, &format!("2024-03-{:02}T09:30:00Z", day))
        })
        .collect();

    let mut a = CalendarBuilder::new(Utc);
    a.extend_posts(&posts).extend_prompts(&prompts);
    let mut b = CalendarBuilder::new(Utc);
    b.extend_prompts(&prompts).extend_posts(&posts);

    assert_eq!(a.build(), b.build());
}
