use aok::{OK, Void};
use eblob_page::{Error, PAGE_SIZE, Pages, Perm, page_size, round_up};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

#[test]
fn test_round_up() {
  assert_eq!(round_up(0, 32), 0);
  assert_eq!(round_up(1, 32), 32);
  assert_eq!(round_up(32, 32), 32);
  assert_eq!(round_up(33, 32), 64);
  assert_eq!(round_up(4097, PAGE_SIZE), 2 * PAGE_SIZE);
}

#[test]
fn test_page_size() {
  let n = page_size();
  assert!(n >= 1024);
  assert!(n.is_power_of_two());
}

#[test]
fn test_alloc_aligned() -> Void {
  let pages = Pages::alloc(100)?;
  assert_eq!(pages.cap(), page_size());
  assert_eq!(pages.len(), 0);
  assert!(pages.is_empty());
  assert_eq!(pages.as_ptr() as usize % page_size(), 0);
  assert_eq!(pages.perm(), Perm::ReadWrite);
  pages.free()?;
  OK
}

#[test]
fn test_alloc_zero_maps_one_page() -> Void {
  let pages = Pages::alloc(0)?;
  assert_eq!(pages.cap(), page_size());
  pages.free()?;
  OK
}

#[test]
fn test_with_data() -> Void {
  let data: Vec<u8> = (0..page_size() + 7).map(|i| i as u8).collect();
  let pages = Pages::with_data(&data)?;
  assert_eq!(pages.cap(), 2 * page_size());
  assert_eq!(&pages[..], &data[..]);
  OK
}

#[test]
fn test_extend_overflow() -> Void {
  let mut pages = Pages::alloc(1)?;
  let cap = pages.cap();
  pages.extend(&vec![1u8; cap])?;
  assert!(matches!(pages.extend(b"x"), Err(Error::Overflow(_, _))));
  OK
}

#[test]
fn test_protect_read_only() -> Void {
  let mut pages = Pages::with_data(b"metadata")?;
  pages.protect(Perm::Read)?;
  assert_eq!(pages.perm(), Perm::Read);
  assert_eq!(&pages[..], b"metadata");
  assert!(matches!(pages.extend(b"x"), Err(Error::NotWritable(Perm::Read))));
  pages.free()?;
  OK
}

#[test]
fn test_protect_execute_readable() -> Void {
  let code = [0xC3u8; 64];
  let mut pages = Pages::with_data(&code)?;
  pages.protect(Perm::ReadExecute)?;
  assert_eq!(&pages[..], &code[..]);
  assert!(matches!(
    pages.extend(b"x"),
    Err(Error::NotWritable(Perm::ReadExecute))
  ));
  info!("rx pages at {:p}", pages.as_ptr());
  pages.free()?;
  OK
}

#[test]
fn test_drop_releases() -> Void {
  for _ in 0..64 {
    let pages = Pages::with_data(&[7u8; 10_000])?;
    drop(pages);
  }
  OK
}
