extern crate sdl2;

use std::error::Error;
use std::time::Duration;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use nes_audio::nes::Nes;
use nes_audio::nes::apu::{config::AudioConfig, register::*, sdl::SdlAudioOutput};
use nes_audio::nes::controller::{basic::StandardController, gamepad::GamepadMap, keyboard::KeyboardMap, Buttons};

/// PPU dots in one NTSC frame.
const DOTS_PER_FRAME: u32 = 341 * 262;

fn key_on(nes: &mut Nes) {
  // pulse 1, constant volume, length counter running, ~440 Hz
  nes.cpu_write(0x4000, 0b1001_1111);
  nes.cpu_write(0x4002, 0xFD);
  nes.cpu_write(0x4003, 0x08);
  // triangle an octave lower
  nes.cpu_write(0x4008, 0x7F);
  nes.cpu_write(0x400A, 0xFD);
  nes.cpu_write(0x400B, 0x08);
}

fn main() -> Result<(), Box<dyn Error>> {
  let sdl_context = sdl2::init()?;
  let video_subsystem = sdl_context.video()?;
  let audio_subsystem = sdl_context.audio()?;
  let _window = video_subsystem.window("NES audio", 256, 240)
    .build()
    .map_err(|e| e.to_string())?;
  let game_controller_subsystem = sdl_context.game_controller()?;
  let mut event_pump = sdl_context.event_pump()?;
  let pad = (0..game_controller_subsystem.num_joysticks()?)
    .find(|&i| game_controller_subsystem.is_game_controller(i))
    .map(|i| game_controller_subsystem.open(i))
    .transpose()?;
  if let Some(pad) = &pad {
    println!("using game controller: {}", pad.name());
  }

  let mut nes = Nes::new([StandardController::new(0), StandardController::new(1)]);
  nes.reset();
  nes.cpu_write(0x4015, ENABLE_PULSE1 | ENABLE_TRIANGLE);
  key_on(&mut nes);

  let config = AudioConfig::default();
  let output = SdlAudioOutput::open(&audio_subsystem, &config, nes.audio_state())?;
  output.start();
  println!("Space replays the note, A/S (or pad B/A) toggle pulse/triangle, Escape quits");

  let keys = KeyboardMap::new(0);
  let pad_map = GamepadMap::new(0);
  let mut previous = Buttons::empty();
  let mut running = true;
  while running {
    for event in event_pump.poll_iter() {
      match event {
        Event::Quit { .. }
        | Event::KeyDown {
            keycode: Some(Keycode::Escape),
            ..
        } => {
          running = false;
        }
        Event::KeyDown {
            keycode: Some(Keycode::Space),
            repeat: false,
            ..
        } => {
          key_on(&mut nes);
          println!("APU {}", nes.apu().snapshot().registers);
        }
        _ => {}
      }
    }

    keys.poll(&event_pump.keyboard_state(), nes.input_mut());
    if let Some(pad) = &pad {
      pad_map.poll(pad, nes.input_mut());
    }
    nes.update_input();
    let held = nes.input().buttons(0);
    let pressed = held - previous;
    previous = held;
    if !pressed.is_empty() {
      let mut enable = nes.cpu_read(0x4015)?;
      if pressed.contains(Buttons::A) {
        enable ^= ENABLE_PULSE1;
      }
      if pressed.contains(Buttons::B) {
        enable ^= ENABLE_TRIANGLE;
      }
      nes.cpu_write(0x4015, enable);
    }

    nes.tick_n(DOTS_PER_FRAME);
    std::thread::sleep(Duration::from_micros(16_639));
  }

  output.stop();
  let stats = output.stats();
  println!("{} buffers played, {} deadline misses", stats.buffers_filled(), stats.deadline_misses());
  Ok(())
}
