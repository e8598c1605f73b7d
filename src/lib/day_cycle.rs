//! Two-parent day cycle.
//!
//! Mother and Father each run on their own thread and care for a fixed set
//! of children over a number of days. Mother does the daytime chores for
//! every child in order and, after bathing a child, hands it to Father
//! through a ready queue. Father reads to and tucks in each child as it
//! becomes ready, then ends the day and wakes Mother for the next one.
//!
//! Two primitives coordinate them:
//! - `day_start`, a [`CountingSemaphore`] with one initial permit. Mother
//!   takes it at the start of each day and Father returns it at the end.
//! - `ready`, a [`BoundedQueue`] of child ids with room for one day's worth
//!   of children. Father blocks on it until the first child is bathed.
//!
//! A parent whose event hook panics unblocks the other one before exiting.
//! Mother closes `ready` with an end marker. Father marks the household
//! abandoned and returns the `day_start` permit so Mother stops at the next
//! day boundary.

use log::{debug, warn};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::errors::{Result, TurnstileError, panic_message};
use crate::sync::{BoundedQueue, CountingSemaphore};
use crate::validation::validate_positive;

pub const DEFAULT_CHILDREN: usize = 12;
pub const DEFAULT_CHORE_DELAY: Duration = Duration::from_micros(100);

/// Something done for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chore {
    WakeUp,
    Breakfast,
    School,
    Dinner,
    Bath,
    Book,
    TuckIn,
}

impl Chore {
    /// Mother's chores, each done for every child before the next begins.
    pub const MOTHER: [Chore; 5] =
        [Chore::WakeUp, Chore::Breakfast, Chore::School, Chore::Dinner, Chore::Bath];

    /// Father's chores, both done for a child before the next child.
    pub const FATHER: [Chore; 2] = [Chore::Book, Chore::TuckIn];

    fn phrase(self) -> &'static str {
        match self {
            Chore::WakeUp => "woken up",
            Chore::Breakfast => "fed breakfast",
            Chore::School => "sent to school",
            Chore::Dinner => "given dinner",
            Chore::Bath => "given a bath",
            Chore::Book => "read a book",
            Chore::TuckIn => "tucked in bed",
        }
    }
}

/// One step of the day cycle, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEvent {
    DayStarted { day: usize },
    MotherAwake { day: usize },
    Chore { day: usize, child: usize, chore: Chore },
    MotherNaps { day: usize },
    FatherAwake { day: usize },
    DayEnded { day: usize },
    FatherSleeps { day: usize },
}

impl DayEvent {
    #[must_use]
    pub fn day(&self) -> usize {
        match *self {
            DayEvent::DayStarted { day }
            | DayEvent::MotherAwake { day }
            | DayEvent::Chore { day, .. }
            | DayEvent::MotherNaps { day }
            | DayEvent::FatherAwake { day }
            | DayEvent::DayEnded { day }
            | DayEvent::FatherSleeps { day } => day,
        }
    }
}

impl fmt::Display for DayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayEvent::DayStarted { day } => {
                write!(f, "This is day #{day} of a day in the life of Mother Hubbard.")
            }
            DayEvent::MotherAwake { .. } => {
                write!(f, "Mother is waking up to take care of the children.")
            }
            DayEvent::Chore { child, chore, .. } => {
                write!(f, "Child #{child} is being {}.", chore.phrase())
            }
            DayEvent::MotherNaps { .. } => write!(f, "Mother is taking a nap break."),
            DayEvent::FatherAwake { .. } => {
                write!(f, "Father is waking up to help with the children.")
            }
            DayEvent::DayEnded { day } => {
                write!(f, "This is the end of day #{day} of a day in the life of Mother Hubbard.")
            }
            DayEvent::FatherSleeps { .. } => write!(
                f,
                "Father is going to sleep and waking up Mother to take care of the children."
            ),
        }
    }
}

/// Receives every [`DayEvent`] from both parent threads.
pub trait DayEvents: Send + Sync {
    fn on_event(&self, _event: &DayEvent) {}
}

impl DayEvents for crate::pipeline::NoopEvents {}

#[derive(Debug, Clone)]
pub struct DayCycleConfig {
    days: usize,
    children: usize,
    chore_delay: Duration,
}

impl DayCycleConfig {
    #[must_use]
    pub fn new(days: usize) -> Self {
        Self { days, children: DEFAULT_CHILDREN, chore_delay: DEFAULT_CHORE_DELAY }
    }

    #[must_use]
    pub fn with_children(mut self, children: usize) -> Self {
        self.children = children;
        self
    }

    /// Time spent on each chore. Zero disables the pause.
    #[must_use]
    pub fn with_chore_delay(mut self, delay: Duration) -> Self {
        self.chore_delay = delay;
        self
    }

    #[must_use]
    pub fn days(&self) -> usize {
        self.days
    }

    #[must_use]
    pub fn children(&self) -> usize {
        self.children
    }
}

#[derive(Debug, Clone)]
pub struct DayCycleReport {
    pub days: usize,
    pub children: usize,
    /// Chores performed by both parents over all days.
    pub chores: u64,
    pub elapsed: Duration,
}

struct Household {
    days: usize,
    children: usize,
    chore_delay: Duration,
    day_start: CountingSemaphore,
    /// Bathed children; `None` means Mother has stopped.
    ready: BoundedQueue<Option<usize>>,
    /// Set once Father has stopped for good.
    abandoned: AtomicBool,
    events: Arc<dyn DayEvents>,
}

impl Household {
    fn chore(&self, day: usize, child: usize, chore: Chore) {
        self.events.on_event(&DayEvent::Chore { day, child, chore });
        if !self.chore_delay.is_zero() {
            thread::sleep(self.chore_delay);
        }
    }

    fn mother(&self) -> thread::Result<u64> {
        let mut chores = 0;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for day in 1..=self.days {
                self.day_start.wait();
                if self.abandoned.load(Ordering::Acquire) {
                    break;
                }
                self.events.on_event(&DayEvent::DayStarted { day });
                self.events.on_event(&DayEvent::MotherAwake { day });

                for chore in Chore::MOTHER {
                    for child in 1..=self.children {
                        self.chore(day, child, chore);
                        chores += 1;
                        if chore == Chore::Bath {
                            self.ready.push(Some(child));
                        }
                    }
                }
                self.events.on_event(&DayEvent::MotherNaps { day });
            }
        }));
        if outcome.is_err() {
            self.ready.push(None);
        }
        outcome.map(|()| chores)
    }

    fn father(&self) -> thread::Result<u64> {
        let mut chores = 0;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for day in 1..=self.days {
                for served in 0..self.children {
                    let Some(child) = self.ready.pop() else {
                        return;
                    };
                    if served == 0 {
                        self.events.on_event(&DayEvent::FatherAwake { day });
                    }
                    for chore in Chore::FATHER {
                        self.chore(day, child, chore);
                        chores += 1;
                    }
                }
                self.events.on_event(&DayEvent::DayEnded { day });
                self.events.on_event(&DayEvent::FatherSleeps { day });
                self.day_start.post();
            }
        }));
        if outcome.is_err() {
            self.abandon();
        }
        outcome.map(|()| chores)
    }

    /// Stop Mother at her next day boundary.
    fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
        self.day_start.post();
    }
}

/// Run the Mother and Father threads for the configured number of days.
///
/// # Errors
///
/// Returns [`TurnstileError::InvalidParameter`] for zero days or children,
/// and a thread error if either parent cannot start or panics.
pub fn run_day_cycle(config: &DayCycleConfig, events: Arc<dyn DayEvents>) -> Result<DayCycleReport> {
    validate_positive(config.days, "days")?;
    validate_positive(config.children, "children")?;

    let start = Instant::now();
    let household = Arc::new(Household {
        days: config.days,
        children: config.children,
        chore_delay: config.chore_delay,
        day_start: CountingSemaphore::new(1),
        // Mother cannot start day k+1 until Father has emptied day k. One
        // extra slot holds the end marker.
        ready: BoundedQueue::new(config.children + 1),
        abandoned: AtomicBool::new(false),
        events,
    });

    let mother = spawn("mother", &household, Household::mother)?;
    let father = match spawn("father", &household, Household::father) {
        Ok(handle) => handle,
        Err(error) => {
            household.abandon();
            if let Err(mother_error) = join("mother", mother) {
                warn!("Mother failed while abandoning the day cycle: {mother_error}");
            }
            return Err(error);
        }
    };

    let mother = join("mother", mother);
    let father = join("father", father);
    let chores = mother? + father?;
    debug!("Day cycle finished {} day(s) with {chores} chore(s)", config.days);

    Ok(DayCycleReport {
        days: config.days,
        children: config.children,
        chores,
        elapsed: start.elapsed(),
    })
}

fn spawn(
    name: &str,
    household: &Arc<Household>,
    role: fn(&Household) -> thread::Result<u64>,
) -> Result<JoinHandle<thread::Result<u64>>> {
    let household = Arc::clone(household);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || role(&household))
        .map_err(|source| TurnstileError::Spawn { name: name.to_string(), source })
}

fn join(name: &str, handle: JoinHandle<thread::Result<u64>>) -> Result<u64> {
    handle.join().and_then(|outcome| outcome).map_err(|payload| TurnstileError::ThreadPanicked {
        thread: name.to_string(),
        message: panic_message(payload.as_ref()),
    })
}
