//! Sample survey documents built with the gatewalk editor.
//!
//! Used by the terminal runner's tests and as starting points for new
//! documents (`gatewalk-run` accepts the saved JSON).

pub mod print_shop;
pub mod workshop_feedback;

pub use print_shop::{PrintShopIds, print_shop};
pub use workshop_feedback::{WorkshopIds, workshop_feedback};

#[cfg(test)]
mod tests {
    use super::*;
    use gatewalk::{
        Answer, Navigator, QuestionId, RecordingSink, Stage, SubmissionStatus, load, problems,
        save,
    };

    fn email() -> QuestionId {
        QuestionId::new("email")
    }

    #[test]
    fn samples_have_no_problems() {
        let (shop, _) = print_shop().unwrap();
        let (workshop, _) = workshop_feedback().unwrap();
        assert!(problems(&shop).is_empty());
        assert!(problems(&workshop).is_empty());
    }

    #[test]
    fn samples_survive_save_and_load() {
        let (workshop, _) = workshop_feedback().unwrap();
        let reloaded = load(&save(&workshop).unwrap()).unwrap();
        assert_eq!(reloaded, workshop);
    }

    #[test]
    fn flyers_skip_the_business_card_page() {
        let (document, ids) = print_shop().unwrap();
        let sink = RecordingSink::new();
        let mut nav = Navigator::new(&document, &sink);

        nav.answer(&email(), Answer::text("sam@example.com")).unwrap();
        nav.go_next().unwrap();
        nav.answer(&ids.product, Answer::select("Flyers")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::Survey(1));
        nav.answer(&ids.paper_size, Answer::select("A5")).unwrap();
        nav.answer(&ids.quantity, Answer::text("250")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::Survey(3));
        nav.answer(&ids.delivery, Answer::select("Courier")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::ThankYou);

        let payload = sink.last().unwrap();
        assert_eq!(payload.get(ids.paper_size.as_str()), Some("A5"));
        assert_eq!(payload.get(ids.finish.as_str()), None);
        assert_eq!(payload.get(ids.notes.as_str()), None);
    }

    #[test]
    fn business_cards_with_ranking_and_other() {
        let (document, ids) = print_shop().unwrap();
        let sink = RecordingSink::new();
        let mut nav = Navigator::new(&document, &sink);

        nav.answer(&email(), Answer::text("sam@example.com")).unwrap();
        nav.go_next().unwrap();
        nav.answer(&ids.product, Answer::select("Business cards")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::Survey(2));
        nav.answer(&ids.finish, Answer::select("Matte")).unwrap();
        nav.answer(&ids.finish, Answer::select("Other")).unwrap();
        nav.answer_other(&ids.finish, "Foil").unwrap();
        nav.answer(&ids.priorities, Answer::rank("Quality", 1)).unwrap();
        nav.answer(&ids.priorities, Answer::rank("Price", 2)).unwrap();
        nav.go_next().unwrap();
        nav.answer(&ids.delivery, Answer::select("Pickup")).unwrap();
        nav.go_next().unwrap();

        let payload = sink.last().unwrap();
        assert_eq!(payload.get(ids.finish.as_str()), Some("Matte, Other"));
        assert_eq!(payload.get(&format!("{}_other", ids.finish)), Some("Foil"));
        assert_eq!(payload.get(ids.priorities.as_str()), Some("Price=2, Quality=1"));
    }

    #[test]
    fn browsing_ends_right_away() {
        let (document, ids) = print_shop().unwrap();
        let sink = RecordingSink::new();
        let mut nav = Navigator::new(&document, &sink);

        nav.answer(&email(), Answer::text("sam@example.com")).unwrap();
        nav.go_next().unwrap();
        nav.answer(&ids.product, Answer::select("Just browsing")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::ThankYou);
        assert_eq!(nav.submission_status(), SubmissionStatus::Submitted);
    }

    #[test]
    fn lab_answer_switches_follow_up() {
        let (document, ids) = workshop_feedback().unwrap();
        let sink = RecordingSink::new();
        let mut nav = Navigator::new(&document, &sink);

        nav.answer(&email(), Answer::text("kim@example.com")).unwrap();
        nav.go_next().unwrap();
        assert!(!nav.is_visible(&ids.built));

        nav.answer(&ids.rating, Answer::select("Great")).unwrap();
        nav.answer(&ids.lab, Answer::select("Yes")).unwrap();
        nav.answer(&ids.built, Answer::text("A tiny parser")).unwrap();
        nav.answer(&ids.lab, Answer::select("No")).unwrap();
        assert!(!nav.is_visible(&ids.built));
        assert!(nav.is_visible(&ids.kept_away));

        let err = nav.go_next().unwrap_err();
        assert_eq!(err.unmet(), &[ids.kept_away.clone()]);

        nav.answer(&ids.kept_away, Answer::select("Schedule clash")).unwrap();
        nav.go_next().unwrap();
        nav.answer(&ids.topics, Answer::select("Async")).unwrap();
        assert_eq!(nav.go_next().unwrap(), Stage::ThankYou);

        let payload = sink.last().unwrap();
        assert_eq!(payload.get(ids.rating.as_str()), Some("Great"));
        assert_eq!(payload.get(ids.built.as_str()), None);
        assert_eq!(payload.get(ids.kept_away.as_str()), Some("Schedule clash"));
        assert_eq!(payload.get(ids.comments.as_str()), None);
    }
}
