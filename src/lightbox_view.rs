use crate::lightbox::{Direction, KeyCommand, LightboxAction, LightboxState, LoadToken, Surface};
use crate::transport::{PlaybackRate, CONTROLS_HIDE_DELAY_MS};
use gloo_timers::callback::Timeout;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, Element, HtmlImageElement, HtmlInputElement, HtmlMediaElement, HtmlSelectElement,
    KeyboardEvent,
};
use yew::prelude::*;

/// Media `readyState` at which enough data is buffered to start playing.
const HAVE_FUTURE_DATA: u16 = 3;
const NO_SCROLL_CLASS: &str = "no-scroll";

impl Reducible for LightboxState {
    type Action = LightboxAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        if next.apply(action) {
            Rc::new(next)
        } else {
            self
        }
    }
}

fn set_body_scroll_locked(locked: bool) {
    let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) else {
        return;
    };

    let classes = body.class_list();
    let _ = if locked {
        classes.add_1(NO_SCROLL_CLASS)
    } else {
        classes.remove_1(NO_SCROLL_CLASS)
    };
}

/// The raw `src` attribute, comparable with the item's own `src`.
fn target_src(event: &Event) -> Option<String> {
    event.target_dyn_into::<Element>()?.get_attribute("src")
}

fn release_video(video: &HtmlMediaElement) {
    if video.get_attribute("src").is_none() {
        return;
    }

    let _ = video.pause();
    let _ = video.remove_attribute("src");
    video.load();
}

fn start_playback(
    video: &HtmlMediaElement,
    token: LoadToken,
    dispatcher: UseReducerDispatcher<LightboxState>,
) {
    let refused = move |reason: String| {
        log::warn!("Autoplay prevented: {reason}");
        dispatcher.dispatch(LightboxAction::PlaybackChanged {
            token,
            playing: false,
        });
    };

    match video.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(error) = JsFuture::from(promise).await {
                refused(format!("{error:?}"));
            }
        }),
        Err(error) => refused(format!("{error:?}")),
    }
}

#[derive(Properties, PartialEq)]
pub struct LightboxProps {
    pub state: UseReducerHandle<LightboxState>,
}

#[function_component(Lightbox)]
pub fn lightbox(props: &LightboxProps) -> Html {
    let state = props.state.clone();
    let video_ref = use_node_ref();
    let image_ref = use_node_ref();
    let wrapper_ref = use_node_ref();
    let hide_timer = use_mut_ref(|| None::<Timeout>);

    let is_open = state.is_open();
    let token = state.token();
    let surface = state.surface();
    let transport = state.transport().clone();

    {
        use_effect_with(is_open, move |is_open| {
            set_body_scroll_locked(*is_open);
            || ()
        });
    }

    {
        let dispatcher = state.dispatcher();
        use_effect_with(is_open, move |is_open| {
            let document = window().and_then(|w| w.document());
            let listener = (*is_open).then(|| {
                Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                    let Some(command) = KeyCommand::from_key(&event.key()) else {
                        return;
                    };
                    if command.prevents_default() {
                        event.prevent_default();
                    }
                    dispatcher.dispatch(command.into_action());
                })
            });

            if let (Some(document), Some(listener)) = (&document, &listener) {
                let _ = document
                    .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            }

            move || {
                if let (Some(document), Some(listener)) = (document, listener) {
                    let _ = document.remove_event_listener_with_callback(
                        "keydown",
                        listener.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    // Source assignment for the shared video element. Runs before the playback sync below.
    {
        let video_ref = video_ref.clone();
        let dispatcher = state.dispatcher();
        let video_src = state.video_src().map(ToString::to_string);
        use_effect_with((video_src, token), move |(video_src, token)| {
            if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                match video_src {
                    Some(src) => {
                        if video.get_attribute("src").as_deref() != Some(src.as_str()) {
                            let _ = video.set_attribute("src", src);
                            video.load();
                        }
                        if video.ready_state() >= HAVE_FUTURE_DATA {
                            dispatcher.dispatch(LightboxAction::CanPlay {
                                token: *token,
                                src: src.clone(),
                            });
                        }
                    }
                    None => release_video(&video),
                }
            }
            || ()
        });
    }

    {
        let image_ref = image_ref.clone();
        let dispatcher = state.dispatcher();
        let image_src = state.image_src().map(ToString::to_string);
        use_effect_with((image_src, token), move |(image_src, token)| {
            if let (Some(image), Some(src)) = (image_ref.cast::<HtmlImageElement>(), image_src) {
                if image.complete() && image.natural_width() > 0 {
                    dispatcher.dispatch(LightboxAction::ImageLoaded {
                        token: *token,
                        src: src.clone(),
                    });
                }
            }
            || ()
        });
    }

    {
        let video_ref = video_ref.clone();
        let dispatcher = state.dispatcher();
        use_effect_with(
            (transport.is_playing(), surface, token),
            move |(playing, surface, token)| {
                if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                    if *playing && *surface == Surface::Video && video.paused() {
                        start_playback(&video, *token, dispatcher);
                    } else if !*playing && !video.paused() {
                        let _ = video.pause();
                    }
                }
                || ()
            },
        );
    }

    // `load()` resets the element's rate, so this also reruns per source.
    {
        let video_ref = video_ref.clone();
        use_effect_with(
            (transport.volume_fraction(), transport.is_muted(), transport.rate(), token),
            move |(volume, muted, rate, _)| {
                if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                    video.set_volume(*volume);
                    video.set_muted(*muted);
                    video.set_default_playback_rate(rate.as_f64());
                    video.set_playback_rate(rate.as_f64());
                }
                || ()
            },
        );
    }

    let close = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(LightboxAction::Close))
    };
    let previous = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| {
            dispatcher.dispatch(LightboxAction::Nav(Direction::Backward))
        })
    };
    let next = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| {
            dispatcher.dispatch(LightboxAction::Nav(Direction::Forward))
        })
    };
    let toggle_playback = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(LightboxAction::TogglePlayback))
    };

    let on_activity = {
        let dispatcher = state.dispatcher();
        let hide_timer = hide_timer.clone();
        Callback::from(move |_: ()| {
            dispatcher.dispatch(LightboxAction::ShowControls);
            let dispatcher = dispatcher.clone();
            // Replacing the handle drops, and so cancels, the previous timer.
            *hide_timer.borrow_mut() = Some(Timeout::new(CONTROLS_HIDE_DELAY_MS, move || {
                dispatcher.dispatch(LightboxAction::HideControls)
            }));
        })
    };
    let onmousemove = on_activity.reform(|_: MouseEvent| ());
    let ontouchstart = on_activity.reform(|_: TouchEvent| ());

    let oncanplay = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            if let Some(src) = target_src(&event) {
                dispatcher.dispatch(LightboxAction::CanPlay { token, src });
            }
        })
    };
    let on_video_error = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            let Some(src) = target_src(&event) else {
                return;
            };
            log::error!("Error loading video: {src}");
            dispatcher.dispatch(LightboxAction::MediaFailed { token, src });
        })
    };
    let on_image_load = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            if let Some(src) = target_src(&event) {
                dispatcher.dispatch(LightboxAction::ImageLoaded { token, src });
            }
        })
    };
    let on_image_error = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            let Some(src) = target_src(&event) else {
                return;
            };
            log::error!("Error loading image: {src}");
            dispatcher.dispatch(LightboxAction::MediaFailed { token, src });
        })
    };
    let onplay = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: Event| {
            dispatcher.dispatch(LightboxAction::PlaybackChanged {
                token,
                playing: true,
            })
        })
    };
    let onpause = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: Event| {
            dispatcher.dispatch(LightboxAction::PlaybackChanged {
                token,
                playing: false,
            })
        })
    };
    let ontimeupdate = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            let (Some(src), Some(video)) = (
                target_src(&event),
                event.target_dyn_into::<HtmlMediaElement>(),
            ) else {
                return;
            };
            dispatcher.dispatch(LightboxAction::TimeUpdate {
                token,
                src,
                current_time: video.current_time(),
                duration: video.duration(),
            });
        })
    };

    let on_seek = {
        let video_ref = video_ref.clone();
        let transport = transport.clone();
        Callback::from(move |event: InputEvent| {
            let Some(input) = event.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let Some(target) = transport.seek_target(input.value_as_number()) else {
                return;
            };
            if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                video.set_current_time(target);
            }
        })
    };
    let on_volume = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                dispatcher.dispatch(LightboxAction::SetVolume(input.value_as_number()));
            }
        })
    };
    let on_toggle_mute = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(LightboxAction::ToggleMute))
    };
    let on_rate = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: Event| {
            let rate = event
                .target_dyn_into::<HtmlSelectElement>()
                .and_then(|select| PlaybackRate::from_value(&select.value()));
            if let Some(rate) = rate {
                dispatcher.dispatch(LightboxAction::SetRate(rate));
            }
        })
    };
    let on_fullscreen = {
        let wrapper_ref = wrapper_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(wrapper) = wrapper_ref.cast::<Element>() {
                if let Err(error) = wrapper.request_fullscreen() {
                    log::warn!("Fullscreen request refused: {error:?}");
                }
            }
        })
    };

    let playing = transport.is_playing();
    let (title, category) = state.caption();
    let progress = transport.progress_percent();
    let rate = transport.rate();

    html! {
        <div
            id="lightbox"
            class={classes!("lightbox", is_open.then_some("active"))}
            aria-hidden={(!is_open).to_string()}
        >
            <div class="lightbox-overlay" onclick={close.clone()}></div>
            <div class="lightbox-content">
                <button class="lightbox-close" type="button" aria-label="Close" onclick={close}>
                    {"×"}
                </button>
                <button class="lightbox-prev" type="button" aria-label="Previous" onclick={previous}>
                    {"‹"}
                </button>
                <button class="lightbox-next" type="button" aria-label="Next" onclick={next}>
                    {"›"}
                </button>

                <div
                    class="lightbox-loading"
                    hidden={!state.is_loading()}
                    role="status"
                    aria-label="Loading"
                >
                    <span class="spinner"></span>
                </div>

                if state.has_failed() {
                    <p class="lightbox-error">{"This item could not be loaded."}</p>
                }

                <img
                    ref={image_ref}
                    class={classes!("lightbox-image", state.is_revealed().then_some("is-revealed"))}
                    hidden={surface != Surface::Image}
                    src={state.image_src().map(|src| AttrValue::from(src.to_string()))}
                    alt={state.current().map(|item| item.alt_text().to_string()).unwrap_or_default()}
                    onload={on_image_load}
                    onerror={on_image_error}
                />

                <div
                    ref={wrapper_ref}
                    class={classes!(
                        "lightbox-video-wrapper",
                        state.is_revealed().then_some("is-revealed"),
                    )}
                    hidden={surface != Surface::Video}
                    onmousemove={onmousemove}
                    ontouchstart={ontouchstart}
                >
                    <video
                        ref={video_ref}
                        class="lightbox-video"
                        playsinline={true}
                        preload="auto"
                        onclick={toggle_playback.clone()}
                        oncanplay={oncanplay}
                        onerror={on_video_error}
                        onplay={onplay}
                        onpause={onpause}
                        ontimeupdate={ontimeupdate}
                    />
                    <div class={classes!("video-overlay-controls", playing.then_some("is-hidden"))}>
                        <button
                            class="video-play-pause"
                            type="button"
                            aria-label="Play/Pause"
                            onclick={toggle_playback.clone()}
                        >
                            <span aria-hidden="true">{if playing { "❚❚" } else { "▶" }}</span>
                        </button>
                    </div>
                    <div
                        class={classes!(
                            "video-controls-bar",
                            (!transport.controls_visible()).then_some("is-hidden"),
                        )}
                    >
                        <div class="video-progress-container">
                            <input
                                type="range"
                                class="video-progress"
                                min="0"
                                max="100"
                                step="0.1"
                                value={format!("{progress:.1}")}
                                oninput={on_seek}
                            />
                            <div class="video-progress-filled" style={format!("width: {progress:.1}%;")}></div>
                        </div>
                        <div class="video-controls-bottom">
                            <button
                                class="video-control-btn play-pause-small"
                                type="button"
                                aria-label="Play/Pause"
                                onclick={toggle_playback}
                            >
                                <span aria-hidden="true">{if playing { "❚❚" } else { "▶" }}</span>
                            </button>
                            <span class="video-time">{transport.time_label()}</span>
                            <button
                                class="video-control-btn mute-btn"
                                type="button"
                                aria-label="Mute/Unmute"
                                aria-pressed={transport.is_muted().to_string()}
                                onclick={on_toggle_mute}
                            >
                                <span aria-hidden="true">{if transport.is_muted() { "🔇" } else { "🔊" }}</span>
                            </button>
                            <input
                                type="range"
                                class="volume-slider"
                                min="0"
                                max="100"
                                step="1"
                                value={transport.volume().to_string()}
                                oninput={on_volume}
                            />
                            <select class="playback-speed" aria-label="Playback speed" onchange={on_rate}>
                                { for PlaybackRate::ALL.iter().map(|option| html! {
                                    <option value={option.as_value()} selected={*option == rate}>
                                        {option.to_string()}
                                    </option>
                                }) }
                            </select>
                            <button
                                class="video-control-btn fullscreen-btn"
                                type="button"
                                aria-label="Fullscreen"
                                onclick={on_fullscreen}
                            >
                                <span aria-hidden="true">{"⛶"}</span>
                            </button>
                        </div>
                    </div>
                </div>

                <div class="lightbox-caption">
                    <h3>{title.to_string()}</h3>
                    <p>{category.to_string()}</p>
                </div>
            </div>
        </div>
    }
}
