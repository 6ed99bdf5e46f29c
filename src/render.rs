use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::card::{BodySegment, CardView};
use crate::i18n::Locale;

pub struct FeedPage<'a> {
    pub title: &'a str,
    pub locale: Locale,
    pub error: Option<&'a str>,
    pub cards: &'a [CardView],
}

pub fn build_html(page: &FeedPage<'_>) -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang=(page.locale.code()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page.title) }
                style { (PreEscaped(builtin::FEED_CSS)) }
            }
            body class="hf" {
                header class="hf-topbar" {
                    h1 { (page.title) }
                }
                @if let Some(message) = page.error {
                    div class="hf-error" role="alert" { (message) }
                }
                main class="hf-feed" {
                    @for card in page.cards {
                        (render_card(card))
                    }
                }
            }
        }
    };
    markup.into_string()
}

pub fn render_card(card: &CardView) -> Markup {
    let vote_class = |active: bool| if active { "hf-vote hf-vote-active" } else { "hf-vote" };

    html! {
        article id=(format!("post-{}", card.post_id)) class="hf-post" {
            header class="hf-post-header" {
                span class="hf-author" data-disabled[!card.can_open_author] {
                    @if let Some(photo) = &card.author_photo {
                        img class="hf-avatar" width="40" height="40" src=(photo) alt="avatar";
                    }
                    (card.author)
                }
                @if let Some(distance) = &card.distance {
                    span class="hf-distance" { (distance) }
                }
            }
            div class="hf-post-body" {
                div class="hf-post-left" {
                    p class="hf-text" {
                        @for segment in &card.segments {
                            (render_segment(segment))
                        }
                    }
                    @if let Some(photo) = &card.photo_url {
                        img class="hf-photo" src=(photo) alt="";
                    }
                }
                div class="hf-post-right" {
                    button type="button" class=(vote_class(!card.can_vote_up)) disabled[!card.can_vote_up] { "▲" }
                    span class="hf-rate" { (card.rate) }
                    button type="button" class=(vote_class(!card.can_vote_down)) disabled[!card.can_vote_down] { "▼" }
                    @if let Some(err) = &card.vote_error {
                        span class="hf-vote-error" title=(err) { "!" }
                    }
                }
            }
            footer class="hf-post-footer" {
                time { (card.age) }
                @if let Some(channel) = &card.channel {
                    span class="hf-sep" { "•" }
                    a class="hf-channel" href=(format!("#channel-{}", channel.id)) { "#" (channel.name) }
                }
                span class="hf-sep" { "•" }
                span class="hf-comments" { (card.comments_count) }
            }
        }
    }
}

fn render_segment(segment: &BodySegment) -> Markup {
    match segment {
        BodySegment::Text(text) => html! { (text) },
        BodySegment::Hashtag {
            tag,
            channel: Some(channel),
        } => html! {
            a class="hf-hashtag" href=(format!("#channel-{}", channel.id)) data-channel-id=(channel.id) { "#" (tag) }
        },
        BodySegment::Hashtag { tag, channel: None } => html! {
            span class="hf-hashtag" { "#" (tag) }
        },
    }
}

/// Plain-text listing for terminals.
pub fn build_text(page: &FeedPage<'_>) -> String {
    let mut out = String::new();
    out.push_str(page.title);
    out.push('\n');
    if let Some(message) = page.error {
        out.push_str("! ");
        out.push_str(message);
        out.push('\n');
    }
    for card in page.cards {
        let vote = match card.vote {
            Some(v) => format!(" [{v}]"),
            None => String::new(),
        };
        out.push_str(&format!(
            "\n{} ({}{}){}\n",
            card.author,
            card.age,
            card.distance
                .as_deref()
                .map(|d| format!(", {d}"))
                .unwrap_or_default(),
            vote
        ));
        let body: String = card
            .segments
            .iter()
            .map(|s| match s {
                BodySegment::Text(t) => t.clone(),
                BodySegment::Hashtag { tag, .. } => format!("#{tag}"),
            })
            .collect();
        out.push_str(&format!("  {body}\n"));
        out.push_str(&format!(
            "  rate {} · comments {} · id {}\n",
            card.rate, card.comments_count, card.post_id
        ));
    }
    out
}
