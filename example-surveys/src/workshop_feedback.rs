use gatewalk::{
    ChoiceVariant, Document, Editor, GateKind, PageId, QuestionId, QuestionType, SurveyError,
    parse_option_list,
};

#[derive(Debug, Clone)]
pub struct WorkshopIds {
    pub rating: QuestionId,
    pub lab: QuestionId,
    /// Revealed by "Yes".
    pub built: QuestionId,
    /// Revealed by "No".
    pub kept_away: QuestionId,
    pub topics: QuestionId,
    pub comments: QuestionId,
}

/// Feedback after a workshop: a reveal gate asks follow-ups depending on
/// whether the respondent joined the lab.
pub fn workshop_feedback() -> Result<(Document, WorkshopIds), SurveyError> {
    let mut editor = Editor::new();
    editor.set_title("Workshop feedback");
    editor.set_welcome_title("How was the workshop?");
    editor.set_welcome_question_text("Your email, so we can send the slides");
    editor.set_thank_you_title("Thanks for your feedback");
    editor.set_redirect_url("https://example.com/slides");

    let session = PageId::new("p1");
    editor.set_page_title(&session, "The session")?;

    let rating = editor.add_question(&session, QuestionType::RatingScale)?;
    editor.set_question_text(&rating, "Overall, the session was")?;
    editor.set_custom_labels(
        &rating,
        Some(vec!["Poor".into(), "Fair".into(), "Good".into(), "Great".into()]),
    )?;

    let lab = editor.add_question(&session, QuestionType::GateChoice)?;
    editor.set_question_text(&lab, "Did you attend the hands-on lab?")?;
    editor.update_question_options(&lab, parse_option_list("(Yes)(No)"))?;
    editor.set_gate_kind(&lab, GateKind::Reveal)?;
    let built = editor.add_reveal_sub_question(&lab, "Yes", QuestionType::ShortText)?;
    editor.set_question_text(&built, "What did you build?")?;
    let kept_away = editor.add_reveal_sub_question(&lab, "No", QuestionType::MultiChoice)?;
    editor.set_question_text(&kept_away, "What kept you away?")?;
    editor.update_question_options(
        &kept_away,
        parse_option_list("(No laptop)(Schedule clash)(Not interested)"),
    )?;

    let note = editor.add_question(&session, QuestionType::InfoDisplay)?;
    editor.set_question_text(&note, "One more page to go.")?;

    let next_time = editor.add_page()?;
    editor.set_page_title(&next_time, "Next time")?;
    let topics = editor.add_question(&next_time, QuestionType::MultiChoice)?;
    editor.set_question_text(&topics, "Which topics should we cover?")?;
    editor.update_question_options(&topics, parse_option_list("(Async)(Macros)(Embedded)"))?;
    editor.set_choice_variant(&topics, ChoiceVariant::Bubble)?;
    editor.set_allow_other(&topics, true)?;
    let comments = editor.add_question(&next_time, QuestionType::ShortText)?;
    editor.set_question_text(&comments, "Anything else?")?;
    editor.set_question_description(&comments, Some("Optional".into()))?;
    editor.set_required(&comments, false)?;

    let ids = WorkshopIds {
        rating,
        lab,
        built,
        kept_away,
        topics,
        comments,
    };
    Ok((editor.into_document(), ids))
}
