use crate::content::{ContentError, PortfolioDocument, ALL_CATEGORY, DATA_URL};
use crate::gallery::{
    is_centered_category, pauses_offscreen, GalleryFilter, GRID_VIDEO_ROOT_MARGIN,
    GRID_VIDEO_VISIBLE_THRESHOLD,
};
use crate::lightbox::{LightboxAction, LightboxState};
use crate::lightbox_view::Lightbox;
use crate::location::{gallery_href, initial_category, url_with_category, Page};
use crate::media::{category_display_name, MediaItem};
use gloo_net::http::Request;
use js_sys::{Array, Math, Reflect};
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, HtmlMediaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, PopStateEvent,
};
use yew::prelude::*;

const SITE_TITLE: &str = "Portfolio";
const EMPTY_CATEGORY_MESSAGE: &str = "No items found in this category.";

#[derive(Clone, PartialEq)]
enum LoadState {
    Loading,
    Ready(Rc<PortfolioDocument>),
    Failed(ContentError),
}

async fn fetch_portfolio() -> Result<PortfolioDocument, ContentError> {
    let response = Request::get(DATA_URL)
        .send()
        .await
        .map_err(|error| ContentError::Network(error.to_string()))?;

    if !response.ok() {
        return Err(ContentError::Status(response.status()));
    }

    response
        .json::<PortfolioDocument>()
        .await
        .map_err(|error| ContentError::Decode(error.to_string()))
}

fn location_path() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

fn location_search() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Records the category in the URL so back/forward restore it.
fn push_category(category: &str) {
    let Some(win) = window() else {
        return;
    };
    let Some(url) = win
        .location()
        .href()
        .ok()
        .and_then(|href| url_with_category(&href, category))
    else {
        return;
    };

    if let Ok(history) = win.history() {
        let _ = history.push_state_with_url(&JsValue::from_str(category), "", Some(&url));
    }
}

fn random_index(len: usize) -> usize {
    (Math::random() * len as f64).floor() as usize
}

fn is_touch_device() -> bool {
    let Some(win) = window() else {
        return false;
    };

    Reflect::has(&win, &JsValue::from_str("ontouchstart")).unwrap_or(false)
        || win.navigator().max_touch_points() > 0
}

/// Calls `on_change` with the category of each history entry the user returns to.
#[hook]
fn use_history_category(on_change: Callback<String>) {
    use_effect_with((), move |_| {
        let win = window();
        let listener = Closure::<dyn FnMut(PopStateEvent)>::new(move |event: PopStateEvent| {
            let category = event
                .state()
                .as_string()
                .unwrap_or_else(|| initial_category(&location_search()));
            on_change.emit(category);
        });

        if let Some(win) = &win {
            let _ = win
                .add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref());
        }

        move || {
            if let Some(win) = win {
                let _ = win.remove_event_listener_with_callback(
                    "popstate",
                    listener.as_ref().unchecked_ref(),
                );
            }
        }
    });
}

impl Reducible for GalleryFilter {
    type Action = String;

    fn reduce(self: Rc<Self>, category: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(&category);
        Rc::new(next)
    }
}

fn pause_other_grid_videos(current: &HtmlMediaElement) {
    let Some(videos) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector_all(".gallery-item video").ok())
    else {
        return;
    };

    for index in 0..videos.length() {
        let Some(video) = videos
            .get(index)
            .and_then(|node| node.dyn_into::<HtmlMediaElement>().ok())
        else {
            continue;
        };
        if &video != current && !video.paused() {
            let _ = video.pause();
        }
    }
}

/// Grid videos carry no source until first played.
fn play_grid_video(video: &HtmlMediaElement, src: &str) {
    pause_other_grid_videos(video);

    if video.get_attribute("src").is_none() {
        let _ = video.set_attribute("src", src);
    }

    if let Ok(promise) = video.play() {
        spawn_local(async move {
            let _ = JsFuture::from(promise).await;
        });
    }
}

fn stop_grid_video(video: &HtmlMediaElement) {
    let _ = video.pause();
    video.set_current_time(0.0);
}

/// Pauses `video` whenever it scrolls out of view. Dropping the pair disconnects the observer.
fn observe_grid_video(
    video: &HtmlMediaElement,
) -> Option<(IntersectionObserver, Closure<dyn FnMut(Array)>)> {
    let callback = Closure::<dyn FnMut(Array)>::new(|entries: Array| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let Ok(video) = entry.target().dyn_into::<HtmlMediaElement>() else {
                continue;
            };
            if pauses_offscreen(entry.is_intersecting(), video.paused()) {
                let _ = video.pause();
            }
        }
    });

    let options = IntersectionObserverInit::new();
    options.set_root_margin(GRID_VIDEO_ROOT_MARGIN);
    options.set_threshold(&JsValue::from_f64(GRID_VIDEO_VISIBLE_THRESHOLD));

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|error| log::warn!("IntersectionObserver unavailable: {error:?}"))
            .ok()?;
    observer.observe(video);
    Some((observer, callback))
}

#[derive(Properties, PartialEq)]
struct MediaTileProps {
    item: MediaItem,
    index: usize,
    #[prop_or_default]
    hidden: bool,
    category_label: AttrValue,
    on_select: Callback<usize>,
}

#[function_component(MediaTile)]
fn media_tile(props: &MediaTileProps) -> Html {
    let is_video = props.item.kind.is_video();
    let loaded = use_state(move || is_video);
    let video_ref = use_node_ref();
    let item = &props.item;

    {
        let video_ref = video_ref.clone();
        use_effect_with(is_video, move |is_video| {
            let observed = is_video
                .then(|| video_ref.cast::<HtmlMediaElement>())
                .flatten()
                .and_then(|video| observe_grid_video(&video));

            move || {
                if let Some((observer, _callback)) = observed {
                    observer.disconnect();
                }
            }
        });
    }

    let select = {
        let on_select = props.on_select.clone();
        let index = props.index;
        Callback::from(move |_: ()| on_select.emit(index))
    };

    let media = if is_video {
        let toggle = {
            let video_ref = video_ref.clone();
            let src = item.src.clone();
            Callback::from(move |_: MouseEvent| {
                if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                    if video.paused() {
                        play_grid_video(&video, &src);
                    } else {
                        stop_grid_video(&video);
                    }
                }
            })
        };
        let (onmouseenter, onmouseleave) = if is_touch_device() {
            (None, None)
        } else {
            let play = {
                let video_ref = video_ref.clone();
                let src = item.src.clone();
                Callback::from(move |_: MouseEvent| {
                    if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                        play_grid_video(&video, &src);
                    }
                })
            };
            let stop = {
                let video_ref = video_ref.clone();
                Callback::from(move |_: MouseEvent| {
                    if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                        stop_grid_video(&video);
                    }
                })
            };
            (Some(play), Some(stop))
        };

        html! {
            <div class="gallery-media" onclick={toggle} {onmouseenter} {onmouseleave}>
                <video
                    ref={video_ref}
                    class="gallery-image"
                    muted={true}
                    loop={true}
                    playsinline={true}
                    preload="none"
                    poster={item.poster.clone().map(AttrValue::from)}
                />
            </div>
        }
    } else {
        let onload = {
            let loaded = loaded.clone();
            Callback::from(move |_: Event| loaded.set(true))
        };

        html! {
            <div class="gallery-media" onclick={select.reform(|_: MouseEvent| ())}>
                <img
                    class={classes!("gallery-image", (*loaded).then_some("loaded"))}
                    src={item.src.clone()}
                    alt={item.alt_text().to_string()}
                    loading="lazy"
                    {onload}
                />
            </div>
        }
    };

    let on_overlay = select.reform(|event: MouseEvent| event.stop_propagation());

    html! {
        <div
            class={classes!(
                "gallery-item",
                item.size_class().to_string(),
                (!*loaded).then_some("loading"),
            )}
            data-category={item.category.clone()}
            hidden={props.hidden}
        >
            {media}
            <div class="gallery-overlay" onclick={on_overlay}>
                <h3 class="gallery-title">{item.title_or_empty().to_string()}</h3>
                <p class="gallery-category">{props.category_label.clone()}</p>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CategoryButtonsProps {
    document: Rc<PortfolioDocument>,
    active: AttrValue,
    on_pick: Callback<String>,
}

#[function_component(CategoryButtons)]
fn category_buttons(props: &CategoryButtonsProps) -> Html {
    let choices = std::iter::once((ALL_CATEGORY.to_string(), "All".to_string())).chain(
        props
            .document
            .portfolio
            .categories
            .iter()
            .filter(|category| category.slug != ALL_CATEGORY)
            .map(|category| {
                (
                    category.slug.clone(),
                    category_display_name(&category.slug, Some(category.name.as_str())),
                )
            }),
    );

    html! {
        <div class="category-buttons" role="tablist">
            { for choices.map(|(slug, label)| {
                let is_active = props.active.as_str() == slug;
                let onclick = {
                    let on_pick = props.on_pick.clone();
                    let slug = slug.clone();
                    Callback::from(move |_: MouseEvent| on_pick.emit(slug.clone()))
                };
                html! {
                    <button
                        type="button"
                        class={classes!("category-btn", is_active.then_some("active"))}
                        role="tab"
                        aria-selected={is_active.to_string()}
                        data-category={slug}
                        {onclick}
                    >
                        {label}
                    </button>
                }
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct PageProps {
    load_state: LoadState,
    on_open: Callback<(usize, Vec<MediaItem>)>,
}

fn status_message(load_state: &LoadState) -> Html {
    match load_state {
        LoadState::Loading => html! { <p class="gallery-status" role="status">{"Loading…"}</p> },
        LoadState::Failed(error) => html! {
            <p class="gallery-error" role="alert">{error.to_string()}</p>
        },
        LoadState::Ready(_) => html! {},
    }
}

#[derive(Properties, PartialEq)]
struct HomeGridProps {
    document: Rc<PortfolioDocument>,
    on_open: Callback<(usize, Vec<MediaItem>)>,
}

#[function_component(HomeGrid)]
fn home_grid(props: &HomeGridProps) -> Html {
    let filter = {
        let document = props.document.clone();
        use_reducer(move || {
            let mut filter = GalleryFilter::new(document.catalog(random_index));
            filter.apply(&initial_category(&location_search()));
            filter
        })
    };

    {
        let dispatcher = filter.dispatcher();
        use_history_category(Callback::from(move |category: String| {
            dispatcher.dispatch(category)
        }));
    }

    let on_pick = {
        let dispatcher = filter.dispatcher();
        Callback::from(move |category: String| {
            push_category(&category);
            dispatcher.dispatch(category);
        })
    };

    let on_select = {
        let filter = filter.clone();
        let on_open = props.on_open.clone();
        Callback::from(move |original_index: usize| {
            if let Some(position) = filter.visible_position(original_index) {
                on_open.emit((position, filter.visible_items()));
            }
        })
    };

    let outcome = filter.outcome();
    let active = filter.active_category().to_string();

    html! {
        <>
            <CategoryButtons
                document={props.document.clone()}
                active={AttrValue::from(active.clone())}
                {on_pick}
            />
            <div
                id="gallery-grid"
                class={classes!("gallery-grid", outcome.centered_layout.then_some("layout-centered"))}
            >
                { for filter.entries().iter().map(|entry| html! {
                    <MediaTile
                        key={entry.original_index}
                        item={entry.item.clone()}
                        index={entry.original_index}
                        hidden={!entry.visible}
                        category_label={AttrValue::from(category_display_name(
                            entry.item.category_or_empty(),
                            entry
                                .item
                                .category
                                .as_deref()
                                .and_then(|slug| props.document.category_name(slug)),
                        ))}
                        on_select={on_select.clone()}
                    />
                }) }
            </div>
            if outcome.has_hidden {
                <div class="gallery-actions">
                    <a class="load-more-btn" href={gallery_href(&active)}>{"View Full Gallery"}</a>
                </div>
            }
        </>
    }
}

fn recent_events(document: &PortfolioDocument) -> Html {
    if document.recent_events.is_empty() {
        return html! {};
    }

    html! {
        <section class="section-block recent-events" aria-labelledby="events-heading">
            <h2 id="events-heading">{"Recent Events"}</h2>
            <div class="events-grid">
                { for document.recent_events.iter().map(|event| {
                    let category = event.category.as_deref().unwrap_or_default();
                    html! {
                        <article class="event-card">
                            <img
                                src={event.src.clone()}
                                alt={event.alt.clone().or_else(|| event.title.clone()).unwrap_or_default()}
                                loading="lazy"
                            />
                            <h3>{event.title.clone().unwrap_or_default()}</h3>
                            <p class="muted">
                                {category_display_name(category, document.category_name(category))}
                            </p>
                        </article>
                    }
                }) }
            </div>
        </section>
    }
}

fn proof_list(heading: &'static str, entries: &[String]) -> Html {
    if entries.is_empty() {
        return html! {};
    }

    html! {
        <div class="proof-group">
            <h3>{heading}</h3>
            <ul class="row-list">
                { for entries.iter().map(|entry| html! { <li>{entry.clone()}</li> }) }
            </ul>
        </div>
    }
}

fn social_proof(document: &PortfolioDocument) -> Html {
    let proof = &document.social_proof;
    if proof.publications.is_empty() && proof.awards.is_empty() && proof.clients.is_empty() {
        return html! {};
    }

    html! {
        <section class="section-block social-proof" aria-labelledby="proof-heading">
            <h2 id="proof-heading">{"Recognition"}</h2>
            {proof_list("Featured In", &proof.publications)}
            {proof_list("Awards", &proof.awards)}
            {proof_list("Clients", &proof.clients)}
        </section>
    }
}

#[function_component(HomePage)]
fn home_page(props: &PageProps) -> Html {
    html! {
        <>
            <section class="section-block" aria-labelledby="portfolio-heading">
                <h2 id="portfolio-heading">{"Portfolio"}</h2>
                {
                    match &props.load_state {
                        LoadState::Ready(document) => html! {
                            <HomeGrid document={document.clone()} on_open={props.on_open.clone()} />
                        },
                        other => status_message(other),
                    }
                }
            </section>
            if let LoadState::Ready(document) = &props.load_state {
                {recent_events(document)}
                {social_proof(document)}
            }
        </>
    }
}

#[derive(Properties, PartialEq)]
struct CategoryGalleryProps {
    document: Rc<PortfolioDocument>,
    on_open: Callback<(usize, Vec<MediaItem>)>,
}

#[function_component(CategoryGallery)]
fn category_gallery(props: &CategoryGalleryProps) -> Html {
    let category = use_state(|| initial_category(&location_search()));

    {
        let setter = category.setter();
        use_history_category(Callback::from(move |next: String| setter.set(next)));
    }

    let on_pick = {
        let setter = category.setter();
        Callback::from(move |next: String| {
            push_category(&next);
            setter.set(next);
        })
    };

    let items = props.document.gallery_items(&category);
    let on_select = {
        let items = items.clone();
        let on_open = props.on_open.clone();
        Callback::from(move |index: usize| on_open.emit((index, items.clone())))
    };

    html! {
        <>
            <h1 class="gallery-page-title">{props.document.category_title(&category)}</h1>
            <CategoryButtons
                document={props.document.clone()}
                active={AttrValue::from((*category).clone())}
                {on_pick}
            />
            if items.is_empty() {
                <p class="gallery-empty">{EMPTY_CATEGORY_MESSAGE}</p>
            } else {
                <div
                    id="gallery-grid"
                    class={classes!("gallery-grid", is_centered_category(&category).then_some("layout-centered"))}
                >
                    { for items.iter().enumerate().map(|(index, item)| html! {
                        <MediaTile
                            key={format!("{}-{index}", *category)}
                            item={item.clone()}
                            {index}
                            category_label={AttrValue::from(category_display_name(
                                item.category_or_empty(),
                                item.category.as_deref().and_then(|slug| props.document.category_name(slug)),
                            ))}
                            on_select={on_select.clone()}
                        />
                    }) }
                </div>
            }
        </>
    }
}

#[function_component(GalleryPage)]
fn gallery_page(props: &PageProps) -> Html {
    html! {
        <section class="section-block gallery-page">
            {
                match &props.load_state {
                    LoadState::Ready(document) => html! {
                        <CategoryGallery document={document.clone()} on_open={props.on_open.clone()} />
                    },
                    other => status_message(other),
                }
            }
        </section>
    }
}

#[function_component(AlbumsPage)]
fn albums_page(props: &PageProps) -> Html {
    let LoadState::Ready(document) = &props.load_state else {
        return html! {
            <section class="section-block albums-page">{status_message(&props.load_state)}</section>
        };
    };

    html! {
        <section class="section-block albums-page" aria-labelledby="albums-heading">
            <h1 id="albums-heading">{"Albums"}</h1>
            <div class="albums-grid">
                { for document.albums().into_iter().map(|album| {
                    let cover = if album.cover.kind.is_video() {
                        let play = Callback::from(|event: MouseEvent| {
                            if let Some(video) = event.target_dyn_into::<HtmlMediaElement>() {
                                if let Ok(promise) = video.play() {
                                    spawn_local(async move {
                                        let _ = JsFuture::from(promise).await;
                                    });
                                }
                            }
                        });
                        let stop = Callback::from(|event: MouseEvent| {
                            if let Some(video) = event.target_dyn_into::<HtmlMediaElement>() {
                                stop_grid_video(&video);
                            }
                        });
                        html! {
                            <video
                                class="album-cover"
                                src={album.cover.src.clone()}
                                muted={true}
                                loop={true}
                                playsinline={true}
                                preload="metadata"
                                onmouseenter={play}
                                onmouseleave={stop}
                            />
                        }
                    } else {
                        html! {
                            <img
                                class="album-cover"
                                src={album.cover.src.clone()}
                                alt={album.cover.alt_text().to_string()}
                                loading="lazy"
                            />
                        }
                    };

                    html! {
                        <a class="album-card" href={gallery_href(&album.slug)}>
                            {cover}
                            <div class="album-info">
                                <h3>{category_display_name(&album.slug, Some(album.name.as_str()))}</h3>
                            </div>
                        </a>
                    }
                }) }
            </div>
        </section>
    }
}

#[function_component(App)]
fn app() -> Html {
    let load_state = use_state(|| LoadState::Loading);
    let lightbox = use_reducer(LightboxState::default);
    let page = Page::from_path(&location_path());

    {
        let load_state = load_state.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_portfolio().await {
                    Ok(document) => {
                        log::info!(
                            "portfolio loaded: {} categories",
                            document.portfolio.categories.len()
                        );
                        load_state.set(LoadState::Ready(Rc::new(document)));
                    }
                    Err(error) => {
                        log::error!("{error}");
                        load_state.set(LoadState::Failed(error));
                    }
                }
            });
            || ()
        });
    }

    let on_open = {
        let dispatcher = lightbox.dispatcher();
        Callback::from(move |(index, items): (usize, Vec<MediaItem>)| {
            dispatcher.dispatch(LightboxAction::Open { index, items });
        })
    };

    let nav_link = |target: Page, label: &'static str| {
        html! {
            <a
                class={classes!("nav-link", (target == page).then_some("active"))}
                href={target.path()}
            >
                {label}
            </a>
        }
    };

    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <div class="page-shell">
                <header class="site-header">
                    <a class="site-title" href={Page::Home.path()}>{SITE_TITLE}</a>
                    <nav class="site-nav" aria-label="Primary">
                        {nav_link(Page::Home, "Home")}
                        {nav_link(Page::Gallery, "Gallery")}
                        {nav_link(Page::Albums, "Albums")}
                    </nav>
                </header>
                <main id="content">
                    {
                        match page {
                            Page::Home => html! {
                                <HomePage load_state={(*load_state).clone()} on_open={on_open.clone()} />
                            },
                            Page::Gallery => html! {
                                <GalleryPage load_state={(*load_state).clone()} on_open={on_open.clone()} />
                            },
                            Page::Albums => html! {
                                <AlbumsPage load_state={(*load_state).clone()} {on_open} />
                            },
                        }
                    }
                </main>
            </div>
            <Lightbox state={lightbox} />
        </>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
