use gatewalk::{
    Document, Editor, JumpTarget, PageId, QuestionId, QuestionType, SurveyError, parse_option_list,
};

/// Ids of the questions in [`print_shop`], for scripted runs.
#[derive(Debug, Clone)]
pub struct PrintShopIds {
    pub product: QuestionId,
    pub paper_size: QuestionId,
    pub quantity: QuestionId,
    pub finish: QuestionId,
    pub priorities: QuestionId,
    pub delivery: QuestionId,
    pub notes: QuestionId,
}

/// Order intake for a print shop.
///
/// The first page routes with a jump gate: flyers and business cards each
/// get their own page before delivery, browsers leave straight away.
pub fn print_shop() -> Result<(Document, PrintShopIds), SurveyError> {
    let mut editor = Editor::new();
    editor.set_title("Print order");
    editor.set_welcome_title("Welcome to Inkwell Print");
    editor.set_welcome_description("A few questions and we will get back to you with a quote.");
    editor.set_thank_you_title("Thank you!");
    editor.set_thank_you_note("We will email your quote within one working day.");

    let order = PageId::new("p1");
    editor.set_page_title(&order, "Your order")?;
    let flyers = editor.add_page()?;
    editor.set_page_title(&flyers, "Flyers")?;
    let cards = editor.add_page()?;
    editor.set_page_title(&cards, "Business cards")?;
    let delivery_page = editor.add_page()?;
    editor.set_page_title(&delivery_page, "Delivery")?;

    let product = editor.add_question(&order, QuestionType::GateChoice)?;
    editor.set_question_text(&product, "What do you need printed?")?;
    editor.update_question_options(
        &product,
        parse_option_list("(Flyers), (Business cards), (Just browsing)"),
    )?;
    editor.set_jump(&product, "Flyers", flyers.clone().into())?;
    editor.set_jump(&product, "Business cards", cards.clone().into())?;
    editor.set_jump(&product, "Just browsing", JumpTarget::End)?;

    let paper_size = editor.add_question(&flyers, QuestionType::SingleChoice)?;
    editor.set_question_text(&paper_size, "Paper size")?;
    editor.update_question_options(&paper_size, parse_option_list("(A6) (A5) (A4) (A3)"))?;
    editor.set_dropdown(&paper_size, true)?;
    let quantity = editor.add_question(&flyers, QuestionType::ShortText)?;
    editor.set_question_text(&quantity, "How many copies?")?;
    // Flyers skip the business card page.
    editor.set_next_page(&flyers, Some(delivery_page.clone()))?;

    let finish = editor.add_question(&cards, QuestionType::MultiChoice)?;
    editor.set_question_text(&finish, "Finish")?;
    editor.update_question_options(&finish, parse_option_list("(Matte)(Gloss)(Rounded corners)"))?;
    editor.set_allow_other(&finish, true)?;
    let priorities = editor.add_question(&cards, QuestionType::RankedChoice)?;
    editor.set_question_text(&priorities, "Rank what matters most")?;
    editor.update_question_options(&priorities, parse_option_list("(Price)(Speed)(Quality)"))?;
    editor.set_required(&priorities, false)?;

    let delivery = editor.add_question(&delivery_page, QuestionType::SingleChoice)?;
    editor.set_question_text(&delivery, "Delivery")?;
    editor.update_question_options(&delivery, parse_option_list("(Pickup)(Courier)"))?;
    let notes = editor.add_question(&delivery_page, QuestionType::ShortText)?;
    editor.set_question_text(&notes, "Anything else we should know?")?;
    editor.set_required(&notes, false)?;

    let ids = PrintShopIds {
        product,
        paper_size,
        quantity,
        finish,
        priorities,
        delivery,
        notes,
    };
    Ok((editor.into_document(), ids))
}
